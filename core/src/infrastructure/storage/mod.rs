pub mod hosted_row_store;

pub use hosted_row_store::HostedRowStore;
