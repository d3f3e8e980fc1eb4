//! Quill interpreter: evaluates AST nodes with a tree-walking interpreter.
//!
//! This crate provides the runtime for the Quill language: values (including
//! first-class functions and tuples), the environment chain, the execution
//! signal, and the evaluator itself with its `&*&` (decorator) and `=>>`
//! (partial application) operators.

pub mod env;
pub mod flow;
pub mod interpreter;
pub mod value;

pub use env::{Binding, Env};
pub use interpreter::Interpreter;
pub use value::{Callable, Function, NativeFn, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use quill_lexer::Lexer;
    use quill_parser::Parser;
    use std::rc::Rc;

    fn run_program(input: &str) -> Result<Value, String> {
        let mut parser =
            Parser::new(Lexer::new(input)).map_err(|e| format!("{}: {}", e.kind.label(), e))?;
        let program = parser
            .parse_program()
            .map_err(|e| format!("{}: {}", e.kind.label(), e))?;
        let mut interpreter = Interpreter::new();
        interpreter
            .run(&program)
            .map_err(|e| format!("{}: {}", e.kind.label(), e))
    }

    fn expect_value(input: &str, expected: Value) {
        match run_program(input) {
            Ok(actual) => assert_eq!(actual, expected, "Program: {}", input),
            Err(e) => panic!("Program failed: {}\nInput: {}", e, input),
        }
    }

    fn expect_error(input: &str, fragment: &str) {
        match run_program(input) {
            Ok(v) => panic!("Expected error but got {:?} for: {}", v, input),
            Err(e) => assert!(
                e.contains(fragment),
                "Expected error containing {:?}, got {:?}\nInput: {}",
                fragment,
                e,
                input
            ),
        }
    }

    #[test]
    fn test_literal_values() {
        expect_value("42;", Value::Int(42));
        expect_value("1.5;", Value::Float(1.5));
        expect_value("\"hello\";", Value::Str("hello".to_string()));
        expect_value("true;", Value::Bool(true));
        expect_value("false;", Value::Bool(false));
    }

    #[test]
    fn test_arithmetic_produces_floats() {
        expect_value("1 + 2 * 3;", Value::Float(7.0));
        expect_value("(1 + 2) * 3;", Value::Float(9.0));
        expect_value("1 + 2 * (3 + 4) - 5;", Value::Float(10.0));
        expect_value("1 + 2.5;", Value::Float(3.5));
        expect_value("1.5 + 2.5 + 3.0;", Value::Float(7.0));
        expect_value("5 / 2;", Value::Float(2.5));
    }

    #[test]
    fn test_modulo_is_integral() {
        expect_value("10 % 3;", Value::Int(1));
        expect_value("10.9 % 4;", Value::Int(2)); // truncation toward zero
        expect_error("1 % 0;", "Modulo by zero");
    }

    #[test]
    fn test_division_by_zero_gives_infinity() {
        expect_value("1 / 0;", Value::Float(f64::INFINITY));
        expect_value("1 / 0.0;", Value::Float(f64::INFINITY));
    }

    #[test]
    fn test_unary_minus() {
        expect_value("-5;", Value::Int(-5));
        expect_value("--5;", Value::Int(5));
        expect_value("---5;", Value::Int(-5));
        expect_value("-2.5;", Value::Float(-2.5));
        expect_error("-\"abc\";", "Cannot negate str");
    }

    #[test]
    fn test_string_concatenation() {
        expect_value("\"a\" + \"b\";", Value::Str("ab".to_string()));
        expect_value("\"n = \" + 5;", Value::Str("n = 5".to_string()));
        expect_value("\"ok: \" + true;", Value::Str("ok: true".to_string()));
        // a null on the right concatenates as "null"
        expect_value(
            "fun int f() { return; } \"v = \" + f();",
            Value::Str("v = null".to_string()),
        );
    }

    #[test]
    fn test_comparisons_are_numeric() {
        expect_value("5 <= 3;", Value::Bool(false));
        expect_value("3 == 3;", Value::Bool(true));
        expect_value("3 != 4;", Value::Bool(true));
        expect_value("1 == 2;", Value::Bool(false));
        expect_value("5 > 3;", Value::Bool(true));
        expect_value("true == 1;", Value::Bool(true));
        expect_error(
            "fun int f() { return 1; } f + 1;",
            "Expected a number, got function",
        );
    }

    #[test]
    fn test_logical_operators() {
        expect_value("true && false || true;", Value::Bool(true));
        expect_value("1 < 2 && 2 < 3;", Value::Bool(true));
        expect_value("false && (1 / 0);", Value::Bool(false));
    }

    #[test]
    fn test_logic_does_not_short_circuit() {
        // the right-hand call runs even though the left side is false
        expect_value(
            "x = 0; fun int f() { x = 2; return 1; } false && f(); x;",
            Value::Int(2),
        );
    }

    #[test]
    fn test_variables_and_assignment() {
        expect_value("x = 5; x;", Value::Int(5));
        expect_value("x = 1; x = x + 2; x;", Value::Float(3.0));
        expect_value("x = 1; x = 2; x;", Value::Int(2));
        // assignment is an expression yielding the assigned value
        expect_value("y = x = 3; y;", Value::Int(3));
        expect_error("x;", "Undefined variable 'x'");
        expect_error("x + 1;", "Undefined variable 'x'");
    }

    #[test]
    fn test_block_scoping() {
        // an assignment inside a block updates the visible outer slot
        expect_value("x = 1; { x = 2; } x;", Value::Int(2));
        expect_value("x = 1; { y = 2; x = y; } x;", Value::Int(2));
        // names first introduced inside a block do not leak
        expect_error("{ y = 10; } y;", "Undefined variable 'y'");
    }

    #[test]
    fn test_const_declarations() {
        expect_value("const y = 2; y;", Value::Int(2));
        expect_error("const y = 2; y = 3;", "Cannot assign to const variable 'y'");
        expect_error("const z = 1; const z = 2;", "Variable 'z' is already declared");
        // a block may shadow an outer const with its own
        expect_value("const k = 1; { const k = 2; } k;", Value::Int(1));
    }

    #[test]
    fn test_if_statements() {
        expect_value("x = 0; if (true) { x = 1; } x;", Value::Int(1));
        expect_value("x = 0; if (false) { x = 1; } x;", Value::Int(0));
        expect_value("x = 0; if (false) { x = 1; } else { x = 2; } x;", Value::Int(2));
        // an if yields the value of the executed branch
        expect_value("if (true) { if (false) { 1; } else { 2; } }", Value::Int(2));
    }

    #[test]
    fn test_condition_coercion() {
        expect_value("if (5) { 1; } else { 2; }", Value::Int(1));
        expect_value("if (0) { 1; } else { 2; }", Value::Int(2));
        expect_value("if (\"abc\") { 1; } else { 2; }", Value::Int(1));
        expect_value("if (\"\") { 1; } else { 2; }", Value::Int(2));
        expect_error("if (abc) { }", "Undefined variable 'abc'");
        // a null condition is an error rather than falsy
        expect_error("fun int f() { return; } if (f()) { }", "Invalid condition value");
    }

    #[test]
    fn test_for_loops() {
        expect_value(
            "sum = 0; for (i = 1; i <= 3; i = i + 1) { sum = sum + i; } sum;",
            Value::Float(6.0),
        );
        // the loop variable lives in the enclosing scope
        expect_value("for (i = 0; i < 3; i = i + 1) { } i;", Value::Float(3.0));
        expect_value(
            "x = 0; for (i = 0; i < 0; i = i + 1) { x = 1; } x;",
            Value::Int(0),
        );
        // const-declaration init
        expect_value(
            "sum = 0; for (const start = 10; sum < 10;) { sum = sum + start; } sum;",
            Value::Float(10.0),
        );
    }

    #[test]
    fn test_for_early_return() {
        expect_value(
            "fun int f() { for (i = 0; i < 10; i = i + 1) { return i; } } f();",
            Value::Int(0),
        );
        // an unconditional loop still terminates at the first return
        expect_value("fun int f() { for (;;) { return 1; } } f();", Value::Int(1));
    }

    #[test]
    fn test_functions() {
        expect_value(
            "fun int add(a:int, b:int) { return a + b; } add(2,3);",
            Value::Float(5.0),
        );
        expect_value(
            "fun int fact(n:int) { if (n <= 1) { return 1; } return n * fact(n - 1); } fact(5);",
            Value::Float(120.0),
        );
        expect_value(
            "fun int f(x:int) { if (x > 0) { return 1; } return 2; } f(5);",
            Value::Int(1),
        );
        expect_value("fun int f() { return 1; return 2; } f();", Value::Int(1));
        expect_value("fun int f() { return; } f();", Value::Null);
        // falling off the end of a body yields null
        expect_value("fun int f() { 1 + 1; } f();", Value::Null);
    }

    #[test]
    fn test_function_local_scope() {
        expect_value("fun int f() { x = 10; return x; } f();", Value::Int(10));
        expect_error("fun int f() { x = 10; return x; } f(); x;", "Undefined variable 'x'");
        expect_error("fun int f() { return q; } f();", "Undefined variable 'q'");
    }

    #[test]
    fn test_free_variables_resolve_in_the_callers_chain() {
        // the callee frame is parented to the caller's environment
        expect_value(
            "fun int get() { return hidden; } \
             fun int wrapper() { hidden = 7; return get(); } \
             wrapper();",
            Value::Int(7),
        );
    }

    #[test]
    fn test_functions_are_values() {
        expect_value(
            "fun int inc(x:int) { return x + 1; } f = inc; f(5);",
            Value::Float(6.0),
        );
        expect_value(
            "fun fun make() { return inc; } fun int inc(x:int) { return x + 1; } g = make(); g(4);",
            Value::Float(5.0),
        );
        expect_value(
            "fun fun f() { return g; } fun int g(x:int) { return x + 1; } f()(4);",
            Value::Float(5.0),
        );
        expect_value(
            "fun int a() { return 1; } fun int b() { return 2; } a() + b();",
            Value::Float(3.0),
        );
    }

    #[test]
    fn test_call_errors() {
        expect_error("x = 5; x();", "Value is not callable");
        expect_error("fun int f() { return 1; } f()();", "Value is not callable");
        expect_error("foo(1);", "Undefined variable 'foo'");
        expect_error(
            "fun int f(a:int) { return a; } f(1,2);",
            "Wrong number of arguments: expected 1, got 2",
        );
        expect_error(
            "fun int f(a:int, b:int) { return a + b; } f(1);",
            "Wrong number of arguments: expected 2, got 1",
        );
    }

    #[test]
    fn test_return_outside_function() {
        expect_error("return 5;", "'return' outside of function");
    }

    #[test]
    fn test_empty_programs() {
        expect_value("", Value::Null);
        expect_value("   \n\t ", Value::Null);
        expect_value("(((1)));", Value::Int(1));
        expect_value("1; 2; 3;", Value::Int(3));
        expect_value(";", Value::Null);
    }

    #[test]
    fn test_tuples() {
        expect_value(
            "(1, 2, 3);",
            Value::Tuple(Rc::new(vec![Value::Int(1), Value::Int(2), Value::Int(3)])),
        );
        // one element in parentheses is not a tuple
        expect_value("x = 5; (x);", Value::Int(5));
    }

    #[test]
    fn test_print_returns_null() {
        expect_value("print(1);", Value::Null);
        expect_value("x = print(1); x;", Value::Null);
        expect_value("print(1 + 2);", Value::Null);
    }

    #[test]
    fn test_bind_basics() {
        expect_value(
            "fun int add(a:int, b:int) { return a + b; } add10 = (10) =>> add; add10(5);",
            Value::Float(15.0),
        );
        expect_value(
            "fun int add3(a:int, b:int, c:int) { return a + b + c; } f = (1, 2) =>> add3; f(3);",
            Value::Float(6.0),
        );
        expect_value(
            "fun int mul(a:int, b:int) { return a * b; } ((2) =>> mul)(5);",
            Value::Float(10.0),
        );
    }

    #[test]
    fn test_bind_chains() {
        expect_value(
            "fun int add3(a:int, b:int, c:int) { return a + b + c; } \
             f1 = (1) =>> add3; f2 = (2) =>> f1; f2(3);",
            Value::Float(6.0),
        );
    }

    #[test]
    fn test_bind_evaluates_tuple_elements() {
        expect_value(
            "fun int add3(a:int, b:int, c:int) { return a + b + c; } \
             g = (1+1, 2*2) =>> add3; g(3);",
            Value::Float(9.0),
        );
        expect_value(
            "fun int inc(x:int) { return x+1; } fun int add(a:int, b:int) { return a+b; } \
             g = (inc(4)) =>> add; g(5);",
            Value::Float(10.0),
        );
    }

    #[test]
    fn test_bind_results_are_plain_functions() {
        expect_value(
            "fun int add(a:int, b:int) { return a+b; } f = (2) =>> add; g = f; g(3);",
            Value::Float(5.0),
        );
        expect_value(
            "fun int fact(n:int) { if (n <= 1) { return 1; } return n * fact(n - 1); } \
             f = (5) =>> fact; f();",
            Value::Float(120.0),
        );
    }

    #[test]
    fn test_bind_errors() {
        expect_error("(1) =>> 42;", "Right side of =>> must be function");
        expect_error(
            "fun int f(a:int, b:int) { return a + b; } g = (1,2,3) =>> f; g();",
            "Too many bound arguments",
        );
        expect_error(
            "fun int f(a:int, b:int, c:int) { return a + b + c; } g = (1) =>> f; g(2);",
            "Wrong number of arguments: expected 2, got 1",
        );
    }

    #[test]
    fn test_partial_application_law() {
        expect_value(
            "fun int add3(a:int, b:int, c:int) { return a + b + c; } \
             ((1, 2) =>> add3)(3) == add3(1, 2, 3);",
            Value::Bool(true),
        );
    }

    #[test]
    fn test_decorator_basics() {
        expect_value(
            "fun int ident(x:int) { return x; } \
             fun int add1(f:fun, x:int) { return f(x + 1); } \
             g = ident &*& add1; g(7);",
            Value::Float(8.0),
        );
        expect_value(
            "fun int square(x:int) { return x * x; } \
             fun int deco(f:fun, x:int) { return f(x * 2); } \
             g = square &*& deco; g(3);",
            Value::Float(36.0),
        );
        expect_value(
            "fun int f(x:int) { return x; } \
             fun bool deco(f:fun, x:int) { return f(x) > 5; } \
             g = f &*& deco; g(10);",
            Value::Bool(true),
        );
    }

    #[test]
    fn test_decorator_chains_and_nesting() {
        expect_value(
            "fun int ident(x:int) { return x; } \
             fun int inc(f:fun, x:int) { return f(x + 1); } \
             fun int dbl(f:fun, x:int) { return f(x * 2); } \
             f = ident &*& inc; g = f &*& dbl; g(3);",
            Value::Float(7.0),
        );
        expect_value(
            "fun int add1(x:int) { return x + 1; } \
             fun int deco(f:fun, x:int) { return f(f(x)); } \
             g = add1 &*& deco; g(3);",
            Value::Float(5.0),
        );
    }

    #[test]
    fn test_decorator_errors() {
        expect_error(
            "fun int deco(f:fun, x:int) { return f(x); } 42 &*& deco;",
            "Decorator requires two functions",
        );
        expect_error(
            "fun int f(x:int) { return x; } f &*& 123;",
            "Decorator requires two functions",
        );
        expect_error(
            "fun int f(x:int) { return x; } fun int deco(f:fun) { return 0; } g = f &*& deco;",
            "Decorator must take (function + base arguments)",
        );
    }

    #[test]
    fn test_decorator_composes_with_bind() {
        expect_value(
            "fun int add(a:int, b:int) { return a+b; } \
             fun int deco(f:fun, x:int) { return f(x + 1); } \
             f = (10) =>> add; g = f &*& deco; g(5);",
            Value::Float(16.0),
        );
        // binding onto a decorated two-argument base inflates the decorator's
        // own call arity past its parameter count
        expect_error(
            "fun int add(a:int, b:int) { return a+b; } \
             fun int deco(f:fun, x:int) { return f(x * 2); } \
             g = add &*& deco; h = (3) =>> g; h(4);",
            "Wrong number of arguments",
        );
    }

    #[test]
    fn test_decorated_functions_are_values() {
        expect_value(
            "fun int ident(x:int) { return x; } \
             fun int deco(f:fun, x:int) { return f(x + 1); } \
             fun int apply(f:fun, x:int) { return f(x); } \
             g = ident &*& deco; apply(g, 4);",
            Value::Float(5.0),
        );
        expect_value(
            "fun int ident(x:int) { return x; } \
             fun fun deco(f:fun, x:int) { return f; } \
             g = ident &*& deco; h = g(10); h(3);",
            Value::Int(3),
        );
        expect_value(
            "fun int fact(n:int) { if (n <= 1) { return 1; } return n * fact(n - 1); } \
             fun int deco(f:fun, x:int) { return f(x); } \
             g = fact &*& deco; g(5);",
            Value::Float(120.0),
        );
    }

    #[test]
    fn test_decoration_law() {
        expect_value(
            "fun int base(x:int) { return x * 3; } \
             fun int deco(f:fun, x:int) { return f(x) + 1; } \
             (base &*& deco)(4) == deco(base, 4);",
            Value::Bool(true),
        );
    }
}
