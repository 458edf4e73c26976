mod refresh_job;

pub use refresh_job::RefreshJob;

#[cfg(test)]
mod tests;
