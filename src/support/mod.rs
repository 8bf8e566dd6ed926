pub mod tariff_file;
