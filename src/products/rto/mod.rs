pub mod product_rto;
