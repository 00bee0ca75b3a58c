mod info_tests;
mod install_tests;
