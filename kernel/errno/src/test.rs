extern crate std;

use crate::*;

#[test]
fn named_numbers() {
    assert_eq!(Errno::InvalidArgs.to_raw(), -22);
    assert_eq!(Errno::NoSuchDevice.to_raw(), -19);
    assert_eq!(Errno::NoMemory.to_raw(), -12);
    assert_eq!(Errno::NotSupported.to_raw(), -95);
    assert_eq!(Errno::from_raw(-22), Errno::InvalidArgs);
    assert_eq!(Errno::from_raw(-1), Errno::NotPermitted);
}

#[test]
fn unknown_numbers_pass_through() {
    for raw in [-3, -38, -1000, i32::MIN] {
        let e = Errno::from_raw(raw);
        assert_eq!(e, Errno::Other(raw));
        assert_eq!(e.to_raw(), raw);
    }
}

#[test]
fn c_style_returns() {
    assert_eq!(from_ret(0), Ok(()));
    assert_eq!(from_ret(7), Ok(()));
    assert_eq!(from_ret(-19), Err(Errno::NoSuchDevice));
    assert_eq!(to_ret(Ok(())), 0);
    assert_eq!(to_ret(Err(Errno::Other(-42))), -42);
}

#[test]
fn display() {
    use std::string::ToString;
    assert_eq!(Errno::InvalidArgs.to_string(), "invalid argument");
    assert_eq!(Errno::Other(-42).to_string(), "error -42");
}
