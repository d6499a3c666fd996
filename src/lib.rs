pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod object;
pub mod environment;
pub mod builtin;
pub mod evaluator;
pub mod repl;
pub mod logger;
