pub mod generation_session;

#[cfg(test)]
pub(crate) mod testing;
