pub mod clock;
pub mod error;
pub mod identity;
pub mod messages;
pub mod registry;
pub mod routes;
pub mod state;
pub mod store;
pub mod sweeper;

#[cfg(test)]
mod testing;
