pub mod diff;
pub mod dump;
pub mod load;

#[cfg(test)]
mod diff_tests;
#[cfg(test)]
mod dump_tests;
