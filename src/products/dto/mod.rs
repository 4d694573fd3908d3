pub mod product_list_query;
