pub(crate) mod hsb;
pub(crate) mod source;
