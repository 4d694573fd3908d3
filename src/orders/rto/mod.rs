pub mod order_rto;
