//! Recursive-descent parser over the source grammar, built with `chumsky`
//! combinators directly on the character stream (no separate lexer pass).

use crate::ast::{BinOp, Block, Expr, Function, Param, PrintItem, Program, Stmt, Type, UnaryOp, VarDecl};
use crate::error::CompileError;
use chumsky::prelude::*;

const KEYWORDS: &[&str] = &[
    "program", "main", "end", "var", "int", "float", "void", "if", "else", "while", "do", "print",
];

fn ident() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    text::ident().padded().try_map(|s: String, span| {
        if KEYWORDS.contains(&s.as_str()) {
            Err(Simple::custom(span, format!("'{s}' is a reserved word")))
        } else {
            Ok(s)
        }
    })
}

fn type_() -> impl Parser<char, Type, Error = Simple<char>> + Clone {
    choice((just("int").to(Type::Int), just("float").to(Type::Float))).padded()
}

fn digits() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
}

fn float_lit() -> impl Parser<char, f64, Error = Simple<char>> + Clone {
    digits()
        .then_ignore(just('.'))
        .then(digits())
        .padded()
        .map(|(whole, frac)| format!("{whole}.{frac}").parse::<f64>().unwrap())
}

fn int_lit() -> impl Parser<char, i64, Error = Simple<char>> + Clone {
    digits().padded().map(|s| s.parse::<i64>().unwrap())
}

fn string_lit() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    just('"')
        .ignore_then(filter(|c: &char| *c != '"').repeated())
        .then_ignore(just('"'))
        .padded()
        .collect::<String>()
}

fn var_decl() -> impl Parser<char, VarDecl, Error = Simple<char>> + Clone {
    just("var")
        .padded()
        .ignore_then(ident().separated_by(just(',').padded()).at_least(1))
        .then_ignore(just(':').padded())
        .then(type_())
        .then_ignore(just(';').padded())
        .map(|(names, ty)| VarDecl { names, ty })
}

fn expr() -> impl Parser<char, Expr, Error = Simple<char>> + Clone {
    recursive(|expr| {
        let atom = choice((
            float_lit().map(Expr::FloatLiteral),
            int_lit().map(Expr::IntLiteral),
            ident().map(Expr::Var),
            expr.delimited_by(just('(').padded(), just(')').padded()),
        ));

        let unary = recursive(|unary| {
            choice((
                just('-')
                    .padded()
                    .ignore_then(unary.clone())
                    .map(|e| Expr::Unary(UnaryOp::Minus, Box::new(e))),
                just('+')
                    .padded()
                    .ignore_then(unary)
                    .map(|e| Expr::Unary(UnaryOp::Plus, Box::new(e))),
                atom,
            ))
        });

        let term = unary
            .clone()
            .then(
                choice((just('*').to(BinOp::Mul), just('/').to(BinOp::Div)))
                    .padded()
                    .then(unary)
                    .repeated(),
            )
            .foldl(|l, (op, r)| Expr::Binary(Box::new(l), op, Box::new(r)));

        let sum = term
            .clone()
            .then(
                choice((just('+').to(BinOp::Add), just('-').to(BinOp::Sub)))
                    .padded()
                    .then(term)
                    .repeated(),
            )
            .foldl(|l, (op, r)| Expr::Binary(Box::new(l), op, Box::new(r)));

        sum.clone()
            .then(
                choice((
                    just("!=").to(BinOp::Ne),
                    just('<').to(BinOp::Lt),
                    just('>').to(BinOp::Gt),
                ))
                .padded()
                .then(sum)
                .repeated(),
            )
            .foldl(|l, (op, r)| Expr::Binary(Box::new(l), op, Box::new(r)))
    })
}

enum StmtTail {
    Call(Vec<Expr>),
    Assign(Expr),
}

fn stmt() -> impl Parser<char, Stmt, Error = Simple<char>> + Clone {
    recursive(|stmt| {
        let block = stmt
            .repeated()
            .delimited_by(just('{').padded(), just('}').padded())
            .map(|statements| Block { statements });

        let if_stmt = just("if")
            .padded()
            .ignore_then(expr().delimited_by(just('(').padded(), just(')').padded()))
            .then(block.clone())
            .then(
                just("else")
                    .padded()
                    .ignore_then(block.clone())
                    .or_not(),
            )
            .then_ignore(just(';').padded())
            .map(|((cond, then_block), else_block)| Stmt::If {
                cond,
                then_block,
                else_block,
            });

        let while_stmt = just("while")
            .padded()
            .ignore_then(expr().delimited_by(just('(').padded(), just(')').padded()))
            .then_ignore(just("do").padded())
            .then(block)
            .then_ignore(just(';').padded())
            .map(|(cond, body)| Stmt::While { cond, body });

        let print_item = choice((
            string_lit().map(PrintItem::Str),
            expr().map(PrintItem::Expr),
        ));
        let print_stmt = just("print")
            .padded()
            .ignore_then(
                print_item
                    .separated_by(just(',').padded())
                    .delimited_by(just('(').padded(), just(')').padded()),
            )
            .then_ignore(just(';').padded())
            .map(Stmt::Print);

        let call_or_assign = ident()
            .then(choice((
                just('(')
                    .padded()
                    .ignore_then(expr().separated_by(just(',').padded()))
                    .then_ignore(just(')').padded())
                    .then_ignore(just(';').padded())
                    .map(StmtTail::Call),
                just('=')
                    .padded()
                    .ignore_then(expr())
                    .then_ignore(just(';').padded())
                    .map(StmtTail::Assign),
            )))
            .map(|(name, tail)| match tail {
                StmtTail::Call(args) => Stmt::Call { name, args },
                StmtTail::Assign(value) => Stmt::Assign { target: name, value },
            });

        choice((if_stmt, while_stmt, print_stmt, call_or_assign))
    })
}

fn block() -> impl Parser<char, Block, Error = Simple<char>> + Clone {
    stmt()
        .repeated()
        .delimited_by(just('{').padded(), just('}').padded())
        .map(|statements| Block { statements })
}

fn param() -> impl Parser<char, Param, Error = Simple<char>> + Clone {
    ident()
        .then_ignore(just(':').padded())
        .then(type_())
        .map(|(name, ty)| Param { name, ty })
}

fn function() -> impl Parser<char, Function, Error = Simple<char>> + Clone {
    just("void")
        .padded()
        .ignore_then(ident())
        .then(
            param()
                .separated_by(just(',').padded())
                .delimited_by(just('(').padded(), just(')').padded()),
        )
        .then(
            var_decl()
                .repeated()
                .then(block())
                .delimited_by(just('[').padded(), just(']').padded()),
        )
        .then_ignore(just(';').padded())
        .map(|((name, params), (vars, body))| Function {
            name,
            params,
            vars,
            body,
        })
}

fn program_parser() -> impl Parser<char, Program, Error = Simple<char>> {
    just("program")
        .padded()
        .ignore_then(ident())
        .then_ignore(just(';').padded())
        .then(var_decl().repeated())
        .then(function().repeated())
        .then_ignore(just("main").padded())
        .then(block())
        .then_ignore(just("end").padded())
        .then_ignore(end())
        .map(|(((name, globals), functions), main)| Program {
            name,
            globals,
            functions,
            main,
        })
}

pub fn parse(source: &str) -> Result<Program, CompileError> {
    program_parser().parse(source).map_err(|errors| {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        CompileError::Syntax(msg)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_program() {
        let src = "program p; var x: int; main { x = 2 + 3 * 4; print(x); } end";
        let program = parse(src).unwrap();
        assert_eq!(program.name, "p");
        assert_eq!(program.globals.len(), 1);
        assert_eq!(program.main.statements.len(), 2);
    }

    #[test]
    fn parses_function_with_brackets_body() {
        let src = "program p; var n,a,b,t,c: int; \
                    void fib(k: int) [ { a = 0; b = 1; c = 0; \
                    while (c < k) do { t = a+b; a = b; b = t; c = c+1; }; print(a); } ]; \
                    main { n = 7; fib(n); } end";
        let program = parse(src).unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "fib");
        assert_eq!(program.functions[0].params.len(), 1);
    }

    #[test]
    fn parses_if_else_and_print_string() {
        let src = r#"program p; var a: int; main { a = 5; if (a < 10) { print("lt"); } else { print("ge"); }; } end"#;
        let program = parse(src).unwrap();
        assert!(matches!(program.main.statements[1], Stmt::If { .. }));
    }

    #[test]
    fn rejects_keyword_as_identifier() {
        assert!(parse("program if; main {} end").is_err());
    }

    #[test]
    fn parenthesized_precedence_reshapes_tree() {
        let src = "program p; var x: int; main { x = (2 + 3) * 4; print(x); } end";
        let program = parse(src).unwrap();
        match &program.main.statements[0] {
            Stmt::Assign { value, .. } => {
                assert!(matches!(value, Expr::Binary(_, BinOp::Mul, _)));
            }
            _ => panic!("expected assignment"),
        }
    }
}
