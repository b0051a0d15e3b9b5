pub mod color;
pub mod logging;
#[cfg(test)]
pub mod test_utils;
