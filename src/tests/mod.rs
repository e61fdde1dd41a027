// Test modules for Concierge
// Each module contains unit tests for the corresponding source file

mod conversation_tests;
mod helpers;
mod protocol_tests;
