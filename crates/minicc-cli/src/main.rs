// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! minicc CLI - front end driver.

use std::env;
use std::fs;
use std::process;

use minicc_diagnostics::{DiagnosticFormatter, ToDiagnostic};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        print_usage();
        process::exit(1);
    }
    let code = match args[1].as_str() {
        "--tokenize" => cmd_tokenize(&args[2]),
        "--parse" => cmd_check(&args[2], false),
        "--print-ast" => cmd_check(&args[2], true),
        other => {
            eprintln!("Unknown flag: {other}");
            print_usage();
            1
        }
    };
    process::exit(code);
}

fn print_usage() {
    eprintln!("Usage: minicc <--tokenize|--parse|--print-ast> <file>");
    eprintln!();
    eprintln!("  --tokenize   Lex the file and print the token stream");
    eprintln!("  --parse      Lex, parse and analyze; silent on success");
    eprintln!("  --print-ast  Like --parse, then pretty-print the program");
}

fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            process::exit(1);
        }
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn report(source: &str, path: &str, err: &dyn ToDiagnostic) {
    let diag = err.to_diagnostic();
    eprint!(
        "{}",
        DiagnosticFormatter::new(source)
            .with_file_name(file_name(path))
            .format(&diag)
    );
}

fn cmd_tokenize(path: &str) -> i32 {
    let source = read_source(path);
    match minicc_lexer::Lexer::new(&source).tokenize() {
        Ok(tokens) => {
            print!("{}", minicc_lexer::dump_tokens(&tokens));
            0
        }
        Err(e) => {
            report(&source, path, &e);
            1
        }
    }
}

fn cmd_check(path: &str, print_ast: bool) -> i32 {
    let source = read_source(path);
    let tokens = match minicc_lexer::Lexer::new(&source).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            report(&source, path, &e);
            return 1;
        }
    };
    let unit = match minicc_parser::Parser::new(tokens).parse() {
        Ok(unit) => unit,
        Err(e) => {
            report(&source, path, &e);
            return 1;
        }
    };
    if let Err(e) = minicc_sema::analyze(&unit) {
        report(&source, path, &e);
        return 1;
    }
    if print_ast {
        print!("{}", minicc_fmt::pretty_print(&unit));
    }
    0
}
