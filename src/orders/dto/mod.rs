pub mod create_order_dto;
