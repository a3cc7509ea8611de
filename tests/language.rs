use kestrel::{Value, execute};

fn eval(source: &str) -> Value {
    execute(source, None).unwrap_or_else(|e| panic!("Script failed: {e}\nScript:\n{source}"))
}

fn assert_long(source: &str, expected: i64) {
    assert_eq!(eval(source), Value::Long(expected), "{source}");
}

fn assert_double(source: &str, expected: f64) {
    assert_eq!(eval(source), Value::Double(expected), "{source}");
}

fn assert_bool(source: &str, expected: bool) {
    assert_eq!(eval(source), Value::Bool(expected), "{source}");
}

fn assert_str(source: &str, expected: &str) {
    assert_eq!(eval(source), Value::from(expected), "{source}");
}

fn assert_nil(source: &str) {
    assert_eq!(eval(source), Value::Nil, "{source}");
}

fn assert_failure(source: &str) {
    if execute(source, None).is_ok() {
        panic!("Script succeeded but was expected to fail:\n{source}");
    }
}

#[test]
fn arithmetic_and_precedence() {
    assert_long("1 + 2 * 3", 7);
    assert_long("(1 + 2) * 3", 9);
    assert_long("10 - 2 - 3", 5);
    assert_long("10 / 2", 5);
    assert_long("10 % 3", 1);
    assert_long("2 ** 3 ** 2", 512);
    assert_long("-2 ** 2", 4);
    assert_double("1 + 0.5", 1.5);
    assert_double("7.0 / 2", 3.5);
}

#[test]
fn bitwise_and_shifts() {
    assert_long("5 & 3", 1);
    assert_long("5 | 2", 7);
    assert_long("5 ^ 1", 4);
    assert_long("~0", -1);
    assert_long("1 << 4", 16);
    assert_long("16 >> 2", 4);
    assert_long("-1 >>> 32", 4294967295);
}

#[test]
fn comparisons_and_logic() {
    assert_bool("2 < 3", true);
    assert_bool("2 >= 3", false);
    assert_bool("1 == 1.0", true);
    assert_bool("1 != 2", true);
    assert_bool("\"a\" < \"b\"", true);
    assert_bool("true && false", false);
    assert_bool("true || false", true);
    assert_bool("!false", true);
    assert_bool("nil == nil", true);
}

#[test]
fn short_circuit_skips_the_right_operand() {
    // The right side would raise if evaluated.
    assert_bool("false && (1 / 0 == 0)", false);
    assert_bool("true || (1 / 0 == 0)", true);
}

#[test]
fn string_concatenation_is_overloaded_plus() {
    assert_str("\"a\" + 1", "a1");
    assert_str("1 + \"a\"", "1a");
    assert_str("\"x\" + true", "xtrue");
}

#[test]
fn script_value_follows_the_semicolon_rule() {
    assert_long("1 + 1", 2);
    assert_nil("1 + 1;");
    assert_long("5; 6", 6);
    assert_nil("let a = 1");
}

#[test]
fn let_assignment_and_scoping() {
    assert_long("let x = 1; x + 1", 2);
    assert_long("let x = 1; x = x + 10; x", 11);
    assert_long("let x = 1; { let x = 2; } x", 1);
    assert_long("let x = 1; { x = 2; } x", 2);
    // Assignment without a binding anywhere creates a global one.
    assert_long("fn setit() { g = 42; } setit(); g", 42);
}

#[test]
fn if_elsif_else_yield_their_block_value() {
    assert_str("let a = 10; if (a > 5) { \"greater\" } else { \"lte\" }", "greater");
    assert_str("let a = 5; if a > 10 { \"big\" } elsif a > 3 { \"mid\" } else { \"small\" }",
               "mid");
    assert_nil("if false { 1 }");
}

#[test]
fn conditions_must_be_boolean() {
    assert_failure("if 1 { }");
    assert_failure("while \"x\" { }");
    assert_failure("1 ? 2 : 3");
}

#[test]
fn while_loops() {
    assert_long("let i = 0; let total = 0; while i < 5 { total = total + i; i = i + 1; } total",
                10);
    assert_long("let i = 0; while true { i = i + 1; if i == 7 { break; } } i", 7);
    assert_long("let i = 0; let odd = 0; while i < 10 { i = i + 1; if i % 2 == 0 { continue; } odd = odd + i; } odd",
                25);
}

#[test]
fn for_loops_over_ranges_and_lists() {
    assert_long("let sum = 0; for i in range(0, 5) { sum = sum + i; } sum", 10);
    assert_long("let sum = 0; for i in range(10, 0, -2) { sum = sum + i; } sum", 30);
    assert_long("let sum = 0; for x in seq.list(2, 4, 6) { sum = sum + x; } sum", 12);
    assert_str("let idx = seq.list(); for i, x in seq.list(10, 20, 30) { seq.add(idx, i); } string.join(idx, \"\")",
               "012");
}

#[test]
fn for_loops_over_maps() {
    assert_str("let m = seq.map(\"a\", 1, \"b\", 2); let keys = seq.list(); for k, v in m { seq.add(keys, k); } string.join(keys, \"\")",
               "ab");
    assert_str("let m = seq.map(\"a\", 1); let out = seq.list(); for e in m { seq.add(out, e.key + \"=\" + str(e.value)); } string.join(out, \",\")",
               "a=1");
    assert_failure("for x in 42 { }");
}

#[test]
fn break_propagates_through_nested_blocks() {
    assert_long("let total = 0; for i in range(0, 10) { if i == 3 { break; } total = total + i; } total",
                3);
}

#[test]
fn functions_and_recursion() {
    assert_long("fn add(a, b) { return a + b; } add(2, 5)", 7);
    assert_long("fn fib(n) { if (n <= 1) { return n; } return fib(n-1) + fib(n-2); } fib(10)",
                55);
    // Without an explicit return the last statement's value is returned.
    assert_long("fn double(x) { x * 2 } double(21)", 42);
}

#[test]
fn call_argument_mismatches_are_tolerated_for_closures() {
    // Missing arguments become undefined, extra arguments are ignored.
    assert_bool("fn f(a, b) { is_def(b) } f(1)", false);
    assert_long("fn f(a) { a } f(1, 2, 3)", 1);
}

#[test]
fn lambdas_and_closures() {
    assert_long("let f = lambda(x, y) -> x + y end; f(3, 4)", 7);
    assert_long("lambda(x) -> x * 2 end(21)", 42);
    assert_long("fn counter() { let c = 0; return lambda() -> c = c + 1 end; } let f = counter(); f(); f(); f()",
                3);
    // Two closures over one frame observe each other's mutation.
    assert_long("fn make() { let c = 0; return seq.list(lambda() -> c = c + 1 end, lambda() -> c end); } let fns = make(); let inc = fns[0]; let get = fns[1]; inc(); inc(); get()",
                2);
}

#[test]
fn string_interpolation() {
    assert_str("let name = \"World\"; \"Hello, #{name}! #{1+2}\"", "Hello, World! 3");
    assert_str("\"no placeholders\"", "no placeholders");
    // Malformed placeholders are substituted literally.
    assert_str("\"#{1 +}\"", "#{1 +}");
    assert_str("\"#{unclosed\"", "#{unclosed");
    // Interpolation sees the current frame.
    assert_str("fn greet(who) { \"hi #{who}\" } greet(\"you\")", "hi you");
}

#[test]
fn string_escapes() {
    assert_long("string.length(\"a\\nb\")", 3);
    assert_str("\"quote: \\\"\"", "quote: \"");
    assert_str("'single #{1}'", "single 1");
}

#[test]
fn regex_literals_and_matching() {
    assert_bool("\"abc123\" =~ /[a-z]+\\d+/", true);
    // A full match is required.
    assert_bool("\"abc\" =~ /ab/", false);
    assert_bool("123 =~ /\\d+/", true);
    // Slash after a value is division, not a regex.
    assert_long("let a = 10; a / 2", 5);
}

#[test]
fn lists_and_subscripts() {
    assert_long("let arr = seq.list(1, 2, 3); arr[1]", 2);
    assert_bool("is_def(seq.list(1)[10])", false);
    assert_long("let arr = seq.list(1, 2, 3); arr[0] = 9; arr[0]", 9);
    assert_failure("let arr = seq.list(1); arr[5] = 0");
    assert_long("count(seq.list(1, 2, 3))", 3);
    assert_bool("is_empty(seq.list())", true);
    assert_bool("include(seq.list(1, 2), 2)", true);
    assert_str("string.join(reverse(seq.list(1, 2, 3)), \"\")", "321");
    assert_str("string.join(sort(seq.list(3, 1, 2)), \"\")", "123");
}

#[test]
fn maps_and_property_access() {
    assert_long("let m = seq.map(\"x\", 1); m.x", 1);
    assert_long("let m = seq.map(\"x\", 1); m.x = 5; m.x", 5);
    assert_long("let m = seq.map(); m[\"y\"] = 2; m[\"y\"]", 2);
    assert_bool("is_def(seq.map(\"a\", 1).b)", false);
    assert_bool("seq.contains_key(seq.map(\"a\", 1), \"a\")", true);
    assert_long("count(seq.remove(seq.map(\"a\", 1, \"b\", 2), \"a\"))", 1);
    // Property access on a non-map is undefined, not an error.
    assert_bool("is_def(1 .x)", false);
}

#[test]
fn sets() {
    assert_long("count(seq.set(1, 2, 2, 3))", 3);
    assert_bool("include(seq.set(1, 2), 2)", true);
    assert_long("count(seq.add(seq.set(1), 2))", 2);
}

#[test]
fn higher_order_builtins() {
    assert_long("let arr = seq.list(1,2,3,4,5); reduce(map(arr, lambda(x) -> x*2 end), lambda(a,x) -> a+x end, 0)",
                30);
    assert_str("string.join(filter(seq.list(1, 2, 3, 4), lambda(x) -> x % 2 == 0 end), \"\")",
               "24");
    assert_str("string.join(filter(seq.list(1, 2, 3), seq.gt(1)), \"\")", "23");
    assert_bool("filter(seq.list(nil, 1), seq.exists())[0] == 1", true);
}

#[test]
fn coercion_builtins() {
    assert_long("long(\"12\")", 12);
    assert_long("long(3.9)", 3);
    assert_double("double(\"2.5\")", 2.5);
    assert_bool("boolean(\"true\")", true);
    assert_str("str(42)", "42");
    assert_str("type(1.5)", "double");
    assert_str("type(\"x\")", "string");
    assert_long("cmp(1, 2)", -1);
    assert_long("identity(7)", 7);
    assert_bool("is_def(no_such_variable)", false);
}

#[test]
fn string_builtins() {
    assert_long("string.length(\"hello\")", 5);
    assert_bool("string.contains(\"hello\", \"ell\")", true);
    assert_bool("string.startsWith(\"hello\", \"he\")", true);
    assert_bool("string.endsWith(\"hello\", \"lo\")", true);
    assert_str("string.substring(\"hello\", 1, 3)", "el");
    assert_str("string.substring(\"hello\", 3)", "lo");
    assert_long("string.indexOf(\"hello\", \"l\")", 2);
    assert_long("string.indexOf(\"hello\", \"z\")", -1);
    assert_long("count(string.split(\"a,b,c\", \",\"))", 3);
    assert_str("string.join(string.split(\"a-b-c\", /-/), \"+\")", "a+b+c");
    assert_str("string.replace_first(\"aaa\", \"a\", \"b\")", "baa");
    assert_str("string.replace_all(\"aaa\", \"a\", \"b\")", "bbb");
}

#[test]
fn math_builtins() {
    assert_double("math.sqrt(9)", 3.0);
    assert_long("math.abs(-4)", 4);
    assert_double("math.abs(-4.5)", 4.5);
    assert_long("math.round(3.7)", 4);
    assert_double("math.floor(3.7)", 3.0);
    assert_double("math.ceil(3.2)", 4.0);
    assert_double("math.pow(2, 10)", 1024.0);
    assert_double("math.log(1)", 0.0);
    assert_double("math.sin(0)", 0.0);
}

#[test]
fn numeric_literal_forms() {
    assert_long("0x10", 16);
    assert_double(".5 + .5", 1.0);
    assert_double("2e2", 200.0);
    assert_double("3M + 1", 4.0);
    assert_str("str(2N ** 10N)", "1024");
    assert_bool("42N == 42", true);
}

#[test]
fn min_max_and_tuples() {
    assert_long("min(3, 1, 2)", 1);
    assert_long("max(seq.list(3, 1, 2))", 3);
    assert_long("count(tuple(1, \"a\", true))", 3);
    assert_long("range(0, 10, 3)[2]", 6);
}

#[test]
fn try_catch_finally() {
    assert_str("try { throw \"boom\"; } catch (e) { e }", "boom");
    assert_str("let log = seq.list(); try { throw \"boom\"; } catch (e) { seq.add(log, e); } finally { seq.add(log, \"done\"); } string.join(log, \",\")",
               "boom,done");
    // Engine errors are catchable too; the handler sees their message.
    assert_bool("try { 1 / 0 } catch (e) { string.contains(e, \"Division by zero\") }", true);
    // finally runs on return paths and its own signal wins.
    assert_long("fn f() { try { return 1; } finally { } } f()", 1);
    assert_long("fn g() { try { return 1; } finally { return 2; } } g()", 2);
    // An uncaught throw surfaces as an error.
    assert_failure("throw 42");
}

#[test]
fn thrown_values_keep_their_shape() {
    assert_long("try { throw seq.list(1, 2) } catch (e) { e[1] }", 2);
}

#[test]
fn ternaries() {
    assert_long("true ? 1 : 2", 1);
    assert_str("let x = 5; x > 3 ? \"y\" : \"n\"", "y");
    assert_long("false ? 1 : true ? 2 : 3", 2);
}

#[test]
fn runtime_errors() {
    assert_failure("1 / 0");
    assert_failure("1 % 0");
    assert_failure("no_such_function()");
    assert_failure("let a = 1; a()");
    assert_failure("break");
    assert_failure("continue");
    assert_failure("1 = 2");
    assert_failure("\"a\" - 1");
}

#[test]
fn parse_errors() {
    assert_failure("1 +");
    assert_failure("let = 1");
    assert_failure("if a { ");
    assert_failure("f(1,)");
    assert_failure("lambda(x,) -> x end");
    assert_failure("\"unterminated");
    assert_failure("a =~ /unterminated");
    assert_failure("a.+");
}

#[test]
fn execute_accepts_a_context_map() {
    use std::collections::HashMap;

    let mut context = HashMap::new();
    context.insert("a".to_string(), Value::Long(40));
    context.insert("b".to_string(), Value::Long(2));

    assert_eq!(execute("a + b", Some(&context)).unwrap(), Value::Long(42));
}

#[test]
fn compiled_scripts_rerun() {
    use std::collections::HashMap;

    let script = kestrel::compile("x * 2").unwrap();

    let mut context = HashMap::new();
    context.insert("x".to_string(), Value::Long(4));
    assert_eq!(script.execute(Some(&context)).unwrap(), Value::Long(8));

    context.insert("x".to_string(), Value::Long(5));
    assert_eq!(script.execute(Some(&context)).unwrap(), Value::Long(10));
}

#[test]
fn top_level_return_ends_the_script() {
    assert_long("return 5; 6", 5);
}
