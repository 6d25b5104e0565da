mod input_tests;
mod runtime_tests;
