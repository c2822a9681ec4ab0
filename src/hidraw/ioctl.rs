//! The IOCTL calls the hidraw backend needs

use nix::ioctl_readwrite_buf;

// From linux/hidraw.h
const HIDRAW_IOC_MAGIC: u8 = b'H';
const HIDRAW_SET_FEATURE: u8 = 0x06;

// HIDIOCSFEATURE(len). The size is taken from the buffer, so a 9 byte
// report gives request code 0xc0094806.
ioctl_readwrite_buf!(
    hidraw_ioc_set_feature,
    HIDRAW_IOC_MAGIC,
    HIDRAW_SET_FEATURE,
    u8
);
