mod data_lifecycle_tests;
mod screen_routing_tests;
