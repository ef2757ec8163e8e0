//! Print the token stream of KDL source files.
//!
//! Usage:
//!   kdl_tokens [OPTIONS] [FILE.kdl ...]
//!   kdl_tokens < file.kdl
//!
//! Options:
//!   --positions, -p   Prefix each token with line:offset
//!   --human, -H       Print a per-file header and token count
//!
//! Lexical errors are reported as `path:line:offset: error: message`; the exit
//! code is 1 if any file failed to lex. Set `RUST_LOG=debug` for lexer logging.

use kdlc::diagnostic::Diagnostic;
use kdlc::dump::format_token;
use kdlc::{Lexer, SourceMap};
use std::io::{self, Read};

#[derive(Clone, Copy)]
struct Options {
    positions: bool,
    human: bool,
}

fn print_file(sources: &SourceMap, id: kdlc::SourceId, options: Options) -> bool {
    let Some(mut lexer) = Lexer::for_file(sources, id) else {
        return false;
    };
    let path = sources
        .get(id)
        .map(|f| f.path().display().to_string())
        .unwrap_or_default();
    match lexer.analyze() {
        Ok(tokens) => {
            if options.human {
                println!("== {} ({} tokens)", path, tokens.len());
            }
            for token in tokens {
                println!("{}", format_token(token, options.positions));
            }
            true
        }
        Err(e) => {
            eprintln!("{}", Diagnostic::from_lex_error(&e, Some(id)).render(sources));
            false
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut take_flag = |long: &str, short: &str| {
        if let Some(pos) = args.iter().position(|a| a == long || a == short) {
            args.remove(pos);
            true
        } else {
            false
        }
    };
    let options = Options {
        positions: take_flag("--positions", "-p"),
        human: take_flag("--human", "-H"),
    };

    let mut sources = SourceMap::new();
    let mut ids = Vec::new();
    if args.is_empty() {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        ids.push(sources.insert("<stdin>", src));
    } else {
        for path in &args {
            match sources.load(path) {
                Ok(id) => ids.push(id),
                Err(e) => eprintln!("{}: {}", path, e),
            }
        }
    }

    let mut failed = ids.len() < args.len();
    for id in ids {
        if !print_file(&sources, id, options) {
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
