pub mod crud;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod reports;
pub mod suppliers;
pub mod system;
pub mod warehouses;

#[cfg(test)]
mod tests;
