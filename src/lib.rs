pub mod common {
    pub mod config;
    pub mod errors;
    pub mod fs;
    pub mod json;
}

pub mod xlsx {
    pub mod cell_address;
    pub mod cell_reader;
    pub mod merged_writer;
    pub mod package;
    pub mod sheet_model;
    pub mod source_workbook;
    pub mod template;
}

pub mod report {
    pub mod assembler;
    pub mod cell_write;
    pub mod field_mapper;
    pub mod fields;
    pub mod rating_export;
    pub mod ratings;
    pub mod ratings_sqlite;
    pub mod reference_rates;
}

pub mod http {
    pub mod dispatcher;
    pub mod protocol;
    pub mod server;
}
