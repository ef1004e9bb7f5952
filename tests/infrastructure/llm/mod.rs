mod streaming_client_test;
mod wire_format_test;
