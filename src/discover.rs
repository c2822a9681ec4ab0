//! Locates the meter's hidraw node through udev

#[cfg(feature = "discover")]
use std::{io, path::PathBuf};

/// USB vendor id of the ZyAura based meters (Holtek)
pub const METER_VENDOR_ID: u16 = 0x04d9;
pub const METER_PRODUCT_ID: u16 = 0xa052;

/// Path of the first hidraw node belonging to a CO2 meter
#[cfg(feature = "discover")]
pub fn find_meter() -> io::Result<Option<PathBuf>> {
    find_device(METER_VENDOR_ID, METER_PRODUCT_ID)
}

/// Path of the first hidraw node whose parent HID device matches `vid:pid`
#[cfg(feature = "discover")]
pub fn find_device(vid: u16, pid: u16) -> io::Result<Option<PathBuf>> {
    let mut enumerator = udev::Enumerator::new()?;
    enumerator.match_subsystem("hidraw")?;

    for raw_device in enumerator.scan_devices()? {
        // The ids live on the parent hid device, not on the hidraw node
        let Ok(Some(hid)) = raw_device.parent_with_subsystem("hid") else {
            continue;
        };
        let ids = hid
            .property_value("HID_ID")
            .and_then(|s| s.to_str())
            .and_then(parse_hid_id);

        match (ids, raw_device.devnode()) {
            (Some((_, v, p)), Some(node)) if v == vid && p == pid => {
                tracing::debug!(node = %node.display(), "found meter");
                return Ok(Some(node.to_path_buf()));
            }
            _ => continue,
        }
    }

    Ok(None)
}

/// Split a udev `HID_ID` property into bus, vendor and product id
///
/// The property looks like `0003:000004D9:0000A052`.
#[cfg_attr(not(feature = "discover"), allow(dead_code))]
fn parse_hid_id(s: &str) -> Option<(u16, u16, u16)> {
    let mut parts = s.split(':').map(|p| u16::from_str_radix(p, 16));
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(bus)), Some(Ok(vid)), Some(Ok(pid)), None) => Some((bus, vid, pid)),
        _ => None,
    }
}
