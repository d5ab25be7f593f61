pub mod agent;
pub mod analyzer;
pub mod cooldown;
pub mod dispatcher;
pub mod replier;
pub mod retry;

#[cfg(test)]
mod tests;
