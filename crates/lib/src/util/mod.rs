pub mod hash;

#[cfg(test)]
pub mod testutil;
