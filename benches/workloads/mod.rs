pub mod access;
pub mod churn;
pub mod fifo;
