use color_eyre::eyre::Result;
use grotsky::{
    config::InterpreterConfig,
    driver::run_source,
    environment::SharedEnvironment,
    interpreter::context::BufferedContext,
    value::{error::RuntimeErrorKind, Value},
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::path::{Path, PathBuf};

fn run_with(source: &str, config: &InterpreterConfig) -> (bool, String) {
    let mut context = BufferedContext::new();
    let succeeded = run_source(source, config, &mut context);
    (succeeded, context.into_data())
}

fn run(source: &str) -> String {
    run_with(source, &InterpreterConfig::default()).1
}

/// Prints a single expression.
fn check(expression: &str, expected: &str) {
    let source = format!("io.println({expression})");
    assert_eq!(run(&source), format!("{expected}\n"), "Failed on `{expression}`");
}

fn check_error(source: &str, message: &str, line: u32) {
    assert_eq!(
        run(source),
        format!("Runtime Error on line {line}\n\t{message}\n"),
        "Failed on:\n{source}"
    );
}

/// Runs some statements and then prints `result`.
fn check_statements(code: &str, result: &str, expected: &str) {
    let source = format!("{code}\nio.println({result})");
    assert_eq!(run(&source), format!("{expected}\n"), "Failed on:\n{code}");
}

/// Runs on a plain spawned thread, which has a smaller stack than the main thread.
fn on_spawned_thread<F>(test: F)
where
    F: FnOnce() + Send + 'static,
{
    std::thread::spawn(test)
        .join()
        .expect("The test thread panicked");
}

#[test]
fn test_arithmetic() {
    check("1", "1");
    check("-1", "-1");
    check("1 + 2 + 3", "6");
    check("8 - 2", "6");
    check("1 * 2 * 3", "6");
    check("12 / 2", "6");
    check("10 % 2", "0");
    check("2^2", "4");
    check("1.5 * 2", "3");
    check("1 / 4", "0.25");
    check("2 + 3 * 4 ^ 2", "50");
    check("(2 + 3) * 4", "20");
}

#[test]
fn test_logical() {
    check("true", "true");
    check("false", "false");
    check("not false", "true");
    check("not true", "false");
    check("not nil", "true");
    check(r#"not """#, "true");
    check("not 0", "true");
    check("not []", "false");
    check("not {}", "false");

    check("true and true", "true");
    check("false and true", "false");
    check("true and false", "false");
    check("false and false", "false");

    check("false or false", "false");
    check("false or true", "true");
    check("true or true", "true");
    check("true or false", "true");
}

#[test]
fn test_logical_short_circuit() {
    check_statements(
        "let calls = 0\nfn touch() {\n    calls = calls + 1\n    return true\n}\nfalse and touch()\ntrue or touch()",
        "calls",
        "0",
    );
}

#[test]
fn test_strings() {
    check(r#""test""#, "test");
    check("\"\n\t\tTitle\n\t\tbody\n\t\t\"", "\n\t\tTitle\n\t\tbody\n\t\t");
    check("\r", "");
    check(r#""te" + "st""#, "test");
    check(r#""test".length"#, "4");
    check(r#""test"[0]"#, "t");
    check(r#""test"[0:2]"#, "te");
    check(r#""longtest"[1:6:2]"#, "oge");
    check(r#"""[1:6:2]"#, "");
    check(r#""ñandú".length"#, "5");
    check(r#"["a\tb", "q\"uote"]"#, r#"["a\tb", "q\"uote"]"#);
}

#[test]
fn test_comparisons() {
    check(r#""test" == "test""#, "true");
    check(r#""test" != "test""#, "false");
    check(r#""a" > "b""#, "false");
    check(r#""a" < "b""#, "true");
    check(r#""a" >= "a""#, "true");
    check(r#""a" >= "b""#, "false");
    check(r#""a" <= "a""#, "true");
    check(r#""b" <= "a""#, "false");

    check("2*2 == 2^3-4", "true");
    check("2*2 != 2^3-4", "false");
    check("10 > 5", "true");
    check("10 < 5", "false");
    check("5 >= 5", "true");
    check("4 >= 5", "false");
    check("5 <= 5", "true");
    check("10 <= 5", "false");

    check("(5 <= 5) and (not true or ((1*(1+4)) == 5))", "true");
}

#[test]
fn test_lists() {
    check("[]", "[]");
    check("[].length", "0");
    check("[1.0, 2.0, 3.0]", "[1, 2, 3]");
    check("[1.0, 2.0, 3.0].length", "3");
    check(r#"[["test", 2^4], not true, 1 < 2]"#, r#"[["test", 16], false, true]"#);
    check("[[1, 2], [3, 4]]", "[[1, 2], [3, 4]]");

    check("[1,2,3,4,5,6][1:][::2][0]", "2");
    check("[1,2,3,4,5,6][:4][::3][1]", "4");
    check("[1,2,3,4,5,6][1:5:2]", "[2, 4]");
    check("[1,2,3,4,5,6][1:5]", "[2, 3, 4, 5]");
    check("[1,2,3,4,5,6][1::2]", "[2, 4, 6]");
    check("[1,2,3,4,5,6][:5:2]", "[1, 3, 5]");
    check("[1,2,3][:]", "[1, 2, 3]");

    check("[1,2,3] + [4,5,6]", "[1, 2, 3, 4, 5, 6]");
    check("-[1,1,1,1,1,1]", "[1]");
    check("-[3, 1, 3, 2, 1]", "[3, 1, 2]");
    check("[1] == [1]", "false");
    check("[1] != [1]", "true");
    check("[1,2,3] - [2,3]", "[1]");

    check("[1,2,3,4,5,6,7,8,9,10,11,12,13,14][:20:0][0:10:100]", "[]");
    check("[1,2][1:20]", "[2]");
    check("[][1:][::2]", "[]");
}

#[test]
fn test_list_identity() {
    check_statements("let a = [1]\nlet b = a", "a == b", "true");
    check_statements("let a = [1]\nlet b = a\nb[0] = 2", "a", "[2]");
}

#[test]
fn test_dicts() {
    check("{}", "{}");
    check("{}.length", "0");
    check("{0: 0, 1: 1}", "{0: 0, 1: 1}");
    check("{0: 0, 1: 1}.length", "2");

    check(r#"{1: {"a": 3}, 3: [1+2*3, "te" + "st"]}[1]"#, r#"{"a": 3}"#);
    check(r#"{1: {"a": 3}, 3: [1+2*3, "te" + "st"]}[1]["a"]"#, "3");
    check(r#"{1: {"a": 3}, 3: [1+2*3, "te" + "st"]}[3][0]"#, "7");
    check(r#"{1: {"a": 3}, 3: [1+2*3, "te" + "st"]}[3][1]"#, "test");
    check("{}[0]", "<nil>");

    check("{1: 2} + {1: 4}", "{1: 4}");
    check("{1: 2} + {3: 4}", "{1: 2, 3: 4}");
    check("{1: 2} == {1: 2}", "false");
    check("{1: 2} != {1: 2}", "true");
    check(r#"{"b": 1, "a": 2, "b": 3}"#, r#"{"b": 3, "a": 2}"#);
}

#[test]
fn test_functions_as_values() {
    check("fn () nil", "<fn anonymous>");
    check("(fn () nil)()", "<nil>");
    check("(fn (a, b) a * b)(3, 4)", "12");
}

#[test]
fn test_nil() {
    check("nil != 0", "true");
    check("nil != nil", "false");
    check("nil == nil", "true");
    check("nil == [nil]", "false");
    check("nil == [nil][0]", "true");
    check(r#""asd" != nil"#, "true");
    check(r#""" == nil"#, "false");
    check(r#"{"asd": 1} != nil"#, "true");
    check(r#"{"asd": nil}["asd"] == nil"#, "true");
}

#[test]
fn test_expression_errors() {
    check_error(r#"1 - "B""#, "A number was expected at this position: -", 1);
    check_error(r#""A" - "B""#, "Undefined operation: -", 1);
    check_error(r#"-"B""#, "Undefined operation: -", 1);
    check_error(r#""B"()"#, "Can only call functions: )", 1);
    check_error(r#""B".prop"#, "Undefined property: prop", 1);
    check_error(
        r#""B".prop = 1"#,
        "Trying to set a property on a Read-Only object: prop",
        1,
    );
    check_error(r#""B" + 1"#, "A string was expected at this position: +", 1);
    check_error("(fn (a, b) a+b)()", "Invalid number of arguments: )", 1);
    check_error("(fn (a, b) a+b).length", "Object expected: length", 1);
    check_error("(fn (a, b) a+b).length = 1", "Object expected: length", 1);
    check_error("[1,2,3,4,5,6][0:3:]", "Expected step of the slice: :", 1);
    check_error(
        r#"[1,2,3,4,5,6]["0":]"#,
        "The operation is only defined for numbers: [",
        1,
    );
    check_error("2[0]", "The object is not subscriptable: [", 1);
    check_error("[].prop", "Undefined property: prop", 1);
    check_error(
        "[].prop = 1",
        "Trying to set a property on a Read-Only object: prop",
        1,
    );
    check_error(r#"[] + """#, "A list was expected at this position: +", 1);
    check_error("[] * []", "Undefined operation: *", 1);
    check_error("let a = {}.prop", "Undefined property: prop", 1);
    check_error(
        "let a = {}\na.prop = 1",
        "Trying to set a property on a Read-Only object: prop",
        2,
    );
    check_error(
        r#"let a = {} + """#,
        "A dictionary was expected at this position: +",
        1,
    );
    check_error("let a = {} * {}", "Undefined operation: *", 1);
    check_error("nil <= nil", "Undefined operation: <=", 1);
    check_error(r#"nil + """#, "Undefined operation: +", 1);
    check_error("[] + nil", "Undefined operation: +", 1);
    check_error("[][0]", "Index out of range: [", 1);
    check_error("[1, 2][-1]", "Index out of range: [", 1);
    check_error(
        "let a = {[1]: 2}",
        "The value cannot be used as a dictionary key: }",
        1,
    );
}

#[test]
fn test_statement_errors() {
    check_error(
        "\nlet a = 1\na.isnumber\n",
        "Undefined property: isnumber",
        3,
    );
    check_error(
        "\nlet a = 1\na.isnumber = false\n",
        "Trying to set a property on a Read-Only object: isnumber",
        3,
    );
    check_error("let a = b", "Undefined variable: b", 1);
    check_error("a = 1", "Undefined variable: a", 1);
    check_error("\nlet a = true\na.isbool\n", "Undefined property: isbool", 3);
    check_error(
        "\nlet a = true\na.isbool = false\n",
        "Trying to set a property on a Read-Only object: isbool",
        3,
    );
    check_error(
        "\nlet a = true\nlet b = false\na + b\n",
        "Undefined operation: +",
        4,
    );
}

#[test]
fn test_destructuring_errors() {
    check_error(
        "\nfor a, b, c in [[1,2]] {\n    io.println(a+b+c)\n}\n",
        "Wrong number of values to unpack: for",
        2,
    );
    check_error(
        "\nfor a, b, c in [\"abc\"] {\n    io.println(a+b+c)\n}\n",
        "Cannot unpack value: for",
        2,
    );
    check_error(
        "\nfor a, b, c in {\"a\": [\"abc\"]} {\n    io.println(a+b+c)\n}\n",
        "Expected 1 or 2 identifiers for dict: for",
        2,
    );
    check_error(
        "\nfor a, b, c in \"abc\" {\n    io.println(a+b+c)\n}\n",
        "Collection expected: for",
        2,
    );
}

#[test]
fn test_dict_access_errors() {
    for access in ["abc[1:2:3]", "abc[:2]", "abc[::2]"] {
        check_error(
            &format!("\nlet abc = {{\"a\": 1, \"b\": 2, \"c\": 3}}\n{access}\n"),
            "Expected key for accessing dictionary: [",
            3,
        );
    }
}

#[test]
fn test_class_errors() {
    check_error(
        "\nlet C = \"C\"\nclass A < C {\n}\n",
        "A class was expected at this position: A",
        3,
    );
    check_error(
        "\nclass C {\n}\nclass A < C {\n    get(a) {\n        return super.get(a)\n    }\n}\nA().get(1)\n",
        "Method not found: get",
        6,
    );
    check_error("\nclass A {\n}\nA.prop\n", "Undefined property: prop", 4);
    check_error(
        "\nclass A {\n}\nA.prop = 1\n",
        "Trying to set a property on a Read-Only object: prop",
        4,
    );
    check_error("\nclass A {\n}\nA + A\n", "Undefined operation: +", 4);
    check_error(
        "\nclass A {\n    init() {\n    }\n}\nA(1)\n",
        "Invalid number of arguments: )",
        6,
    );
    check_error("\nclass A {\n}\nA().get\n", "Undefined property: get", 4);
    check_error(
        "\nclass A {\n}\nA() + A()\n",
        "Undefined operator for this object: +",
        4,
    );
}

#[test]
fn test_globals() {
    check("io", "<instance native>");
    check("io.println", "<fn native>");
    check_error(
        "io.miguel = 2",
        "Trying to set a property on a Read-Only object: miguel",
        1,
    );
    check("io.println", "<fn native>");
    assert_eq!(run("io.println(1, \"a\", [\"b\"], nil)"), "1 a [\"b\"] <nil>\n");
}

#[test]
fn test_strings_module() {
    check(r#"strings.toLower("AbC")"#, "abc");
    check(r#"strings.toUpper("AbC")"#, "ABC");
    check(r#"strings.ord("a")"#, "97");
    check("strings.chr(97)", "a");
    check(r#"strings.asNumber(" 12.5 ")"#, "12.5");
    check(r#"strings.asNumber("twelve")"#, "<nil>");
    check(r#"strings.split("a,b,,c", ",")"#, r#"["a", "b", "", "c"]"#);
    check_error(
        "strings.toLower(1)",
        "A string was expected at this position: )",
        1,
    );
    check_error(
        r#"strings.split("a")"#,
        "Invalid number of arguments: )",
        1,
    );
}

#[test]
fn test_env_module() {
    check_statements(
        r#"env.set("GROTSKY_TEST_VARIABLE", "value")"#,
        r#"env.get("GROTSKY_TEST_VARIABLE")"#,
        "value",
    );
    check(r#"env.get("GROTSKY_TEST_VARIABLE_THAT_IS_NOT_SET")"#, "<nil>");
}

#[test]
fn test_env_set_rejects_invalid_names() {
    for name in ["\"A=B\"", "\"\"", "\"A\0B\""] {
        check_statements(
            &format!("let caught = false\ntry {{\n    env.set({name}, \"x\")\n}} catch e {{\n    caught = type(e)\n}}"),
            "caught",
            "string",
        );
    }
    check_statements(
        "let caught = false\ntry {\n    env.set(\"GROTSKY_NUL_VALUE\", \"a\0b\")\n} catch e {\n    caught = true\n}",
        "caught, env.get(\"GROTSKY_NUL_VALUE\")",
        "true <nil>",
    );
}

#[test]
fn test_io_files() -> Result<()> {
    let path = temp_dir("io_files")?.join("notes.txt");
    let path = grotsky_path(&path);
    check_statements(
        &format!("io.writeFile(\"{path}\", \"first line\")"),
        &format!("io.readFile(\"{path}\"), io.fileExists(\"{path}\")"),
        "first line true",
    );
    check(r#"io.fileExists("/this/path/does/not/exist.gr")"#, "false");
    check("type(io.clock())", "number");
    Ok(())
}

#[test]
fn test_io_directories() -> Result<()> {
    let root = temp_dir("io_directories")?;
    let nested = grotsky_path(&root.join("outer").join("inner"));
    let file = grotsky_path(&root.join("outer").join("notes.txt"));
    let outer = grotsky_path(&root.join("outer"));
    check_statements(
        &format!("io.mkdirAll(\"{nested}\", 493)\nio.writeFile(\"{file}\", \"abc\")\nlet entries = io.listDir(\"{outer}\")"),
        r#"entries.length, entries[0]["name"], entries[0]["is_dir"], entries[1]["name"], entries[1]["size"], entries[1]["is_dir"]"#,
        "2 inner true notes.txt 3 false",
    );
    check_statements(
        "let message = nil\ntry {\n    io.listDir(\"/this/path/does/not/exist\")\n} catch err {\n    message = type(err)\n}",
        "message",
        "string",
    );
    Ok(())
}

#[test]
fn test_comments() {
    check_statements("\n# This is a \"comment\"\nlet i = 0\n", "i", "0");
}

#[test]
fn test_if_elif_else() {
    let program = |start: u32| {
        format!(
            "let i = {start}\nif i == 100 {{\n    i = 10\n}} elif i < 10 {{\n    i = 20\n}} else {{\n    i = 100\n}}"
        )
    };
    check_statements(&program(0), "i", "20");
    check_statements(&program(20), "i", "100");
    check_statements(&program(100), "i", "10");
}

#[test]
fn test_loops() {
    check_statements(
        "let i = 0\nwhile i*2 < 10 {\n    i = i + 1\n}",
        "i",
        "5",
    );
    check_statements(
        "let x = 1\nfor let i = 1; i <= 8; i = i+1 {\n    x = x * i\n}",
        "x",
        "40320",
    );
    check_statements(
        "let x = 40320\nlet u = 0\nfor ; u < 10; u = u + 1 {\n    x = x - u\n}",
        "x",
        "40275",
    );
    check_statements(
        "let x = 40275\nlet arr = [1, 2, 3, 4]\nfor el in arr {\n    x = x + el\n}",
        "x",
        "40285",
    );
    check_statements(
        "let x = 40285\nlet mat = [[1, 2], [3, 4]]\nfor n, m in mat {\n    x = x + n + m\n}",
        "x",
        "40295",
    );
    check_statements(
        "let x = 40295\nlet dict = {1: 2, 3: 4}\nfor key, val in dict {\n    x = x + key + val\n}",
        "x",
        "40305",
    );
    check_statements(
        "let x = 40305\nlet dict = {1: 2, 3: 4}\nfor key in dict {\n    x = x + key\n}",
        "x",
        "40309",
    );
}

#[test]
fn test_environment_assign_targets_nearest_binding() {
    let outer = SharedEnvironment::new();
    outer.declare("a", Value::Number(1.0));
    let inner = outer.new_scope();
    assert_eq!(inner.assign("a", Value::Number(2.0)), Ok(()));
    assert!(matches!(outer.access("a"), Some(Value::Number(value)) if value == 2.0));
    assert_eq!(
        inner.assign("missing", Value::Nil),
        Err(RuntimeErrorKind::UndefinedVariable)
    );
    assert!(outer.access("missing").is_none());
}

#[test]
fn test_loop_variable_outlives_loop() {
    check_statements("for let i = 0; i < 3; i = i + 1 {\n}", "i", "3");
    check_statements(
        "let i = 10\nfor let i = 0; i < 2; i = i + 1 {\n}",
        "i",
        "2",
    );
    check_statements(
        "let total = 0\nfor let i = 0; i < 4; i = i + 1 {\n    let doubled = i * 2\n    total = total + doubled\n}",
        "total, i",
        "12 4",
    );
}

#[test]
fn test_functions() {
    check_statements("fn nilCheck() {\n    return\n}\nlet i = nilCheck()", "i", "<nil>");
    check_statements("fn one() 1\nlet i = one()", "i", "1");
    check_statements("let one = fn () {\n    return 1\n}\nlet i = one()", "i", "1");
    check_statements("fn check(i) {\n    return i\n}\nlet i = check(10)", "i", "10");
    check_statements(
        "fn fib(i) {\n    if i == 0 {\n        return 0\n    } elif i == 1 {\n        return 1\n    } else {\n        return fib(i-1)+fib(i-2)\n    }\n}\nlet f = fib(10)",
        "f",
        "55",
    );
    check_statements(
        "fn count(i) {\n    while true {\n        i = i - 1\n        if i < 0 {\n            return i\n        }\n    }\n    return i\n}\nlet f = count(10)",
        "f",
        "-1",
    );
    check_statements(
        "fn count(i) {\n    for let n = 0; n < 1; n = n + 1 {\n        return n\n    }\n    return i\n}\nlet f = count(10)",
        "f",
        "0",
    );
    check_statements(
        "fn testBreakContinue() {\n    let i = 0\n    while true {\n        i = i + 1\n        if i % 2 == 0 {\n            continue\n        }\n        if i >= 10 {\n            break\n        }\n    }\n    return i\n}\nlet f = testBreakContinue()",
        "f",
        "11",
    );
    check_statements(
        "fn firstEl(arr) {\n    for e in arr {\n        return e\n    }\n}\nlet f = firstEl([3,4,5])",
        "f",
        "3",
    );
    check_statements(
        "fn firstKey(dict) {\n    for key in dict {\n        return key\n    }\n}\nlet f = firstKey({1:2})",
        "f",
        "1",
    );
    check_statements("fn ff() {\n}", "ff", "<fn ff>");
}

#[test]
fn test_closures() {
    check_statements(
        "fn counter() {\n    let count = 0\n    return fn () {\n        count = count + 1\n        return count\n    }\n}\nlet a = counter()\nlet b = counter()\na()\na()\nb()",
        "a(), b()",
        "3 2",
    );
}

#[test]
fn test_classes() {
    check_statements(
        "class Pan {\n    init () {\n        this.pan = 1\n    }\n}",
        "Pan().pan",
        "1",
    );
    check_statements(
        "class Food {\n    init () {\n        this.msg = \"good\"\n    }\n}\nclass Pan < Food {\n    init () {\n        super.init()\n    }\n}",
        "Pan().msg",
        "good",
    );
    check_statements(
        "class Food {\n    eat () {\n        this.msg = \"eating\"\n    }\n}\nclass Pan < Food {\n}\nlet bread = Pan()\nbread.eat()",
        "bread.msg",
        "eating",
    );
    check_statements(
        "class Container {\n    class get(a) {\n        return a\n    }\n}",
        "Container.get(1)",
        "1",
    );
    check_statements(
        "class B {\n}\nclass A < B {\n}",
        "A",
        "<class A extends B>",
    );
    check_statements(
        "class B {\n    init() {\n        this.msg = \"ok\"\n    }\n}\nclass A < B {\n    init() {\n        super()\n    }\n}\nlet a = A()",
        "a.msg",
        "ok",
    );
}

#[test]
fn test_operator_overloading() {
    let operate = "class Operate {\n    init (val) {\n        this.val = val\n    }\n\n    add (o) {\n        return Operate(o.val + this.val)\n    }\n\n    neg () Operate(-this.val)\n\n    lt (o) this.val < o.val\n}";
    check_statements(
        &format!("{operate}\nlet a = Operate(1)\nlet b = Operate(2)\nlet c = a + b"),
        "c.val",
        "3",
    );
    check_statements(
        &format!("{operate}\nlet a = Operate(1)"),
        "a",
        "<instance <class Operate>>",
    );
    check_statements(
        &format!("{operate}\nclass Child < Operate {{\n}}\nlet c = Child(1)"),
        "c, [c]",
        "<instance <class Child>> [<instance <class Child>>]",
    );
    check_statements(
        &format!("{operate}\nlet a = -Operate(4)"),
        "a.val, Operate(1) < Operate(2)",
        "-4 true",
    );
    check_statements(
        &format!("{operate}\nclass Child < Operate {{\n}}\nlet c = Child(1) + Child(2)"),
        "c.val",
        "3",
    );
}

#[test]
fn test_initializer_returns_instance() {
    check_statements(
        "class A {\n    init() {\n        this.value = 1\n        return\n    }\n}\nlet a = A()\nlet b = a.init()",
        "b.value, type(b)",
        "1 object",
    );
}

#[test]
fn test_collection_assignment() {
    check_statements("let list = [1, 2, 3]\nlist[0] = 10", "list[0]", "10");
    check_statements(
        "let dict = {\n    \"a\": 1,\n    \"b\": 2\n}\ndict[\"c\"] = 3",
        "dict[\"c\"]",
        "3",
    );
    check_statements("let list = [[1], 2, 3]\nlist[0][0] = 10", "list[0][0]", "10");
    check_statements(
        "let dictlist = {\"a\": [1, 2, 3]}\ndictlist[\"a\"][0] = 10",
        "dictlist[\"a\"][0]",
        "10",
    );
    check_statements(
        "let listdict = [1, 2, 3, {\"a\": 1}]\nlistdict[3][\"b\"] = 2",
        "listdict[3][\"b\"]",
        "2",
    );
    check_statements(
        "let dictdict = {\"a\": {\"A\": 1}}\ndictdict[\"a\"][\"B\"] = 2",
        "dictdict[\"a\"][\"B\"]",
        "2",
    );
    check_statements(
        "class A {\n    init() {\n        this.dict = {}\n    }\n\n    do() {\n        this.dict[\"a\"] = 1\n    }\n}\nlet a = A()\na.do()",
        "a.dict[\"a\"]",
        "1",
    );
}

#[test]
fn test_types() {
    check_statements(
        "io.println(type(\"\"))\nio.println(type(1))\nio.println(type([]))\nio.println(type({}))\nclass A {\n    get() {}\n}\nio.println(type(A))\nio.println(type(A()))\nio.println(type(A().get))\nio.println(type(nil))",
        "type(true)",
        "string\nnumber\nlist\ndict\nclass\nobject\nfunction\nnil\nbool",
    );
}

#[test]
fn test_try_catch() {
    check_statements(
        "let message = nil\ntry {\n    let a = 1 + nil\n} catch err {\n    message = err\n}",
        "message",
        "Undefined operation",
    );
    check_statements(
        "fn fail() {\n    return [][0]\n}\nlet caught = \"\"\ntry {\n    fail()\n} catch err {\n    caught = err\n}",
        "caught",
        "Index out of range",
    );
    check_statements(
        "let ran = false\ntry {\n    ran = true\n} catch err {\n    ran = \"handler\"\n}",
        "ran",
        "true",
    );
}

#[test]
fn test_error_inside_catch_propagates() {
    check_error(
        "try {\n    nil + 1\n} catch err {\n    missing\n}",
        "Undefined variable: missing",
        4,
    );
}

#[test]
fn test_top_level_return_stops_program() {
    assert_eq!(run("io.println(1)\nreturn\nio.println(2)"), "1\n");
}

#[test]
fn test_max_recursion() {
    on_spawned_thread(|| {
        let config = InterpreterConfig {
            max_call_depth: 20,
            ..InterpreterConfig::default()
        };
        let (succeeded, output) = run_with("fn forever(n) forever(n + 1)\nforever(0)", &config);
        assert!(!succeeded);
        assert_eq!(
            output,
            "Runtime Error on line 1\n\tMax recursion depth exceeded: )\n"
        );

        let (succeeded, output) = run_with(
            "fn forever(n) forever(n + 1)\ntry {\n    forever(0)\n} catch err {\n    io.println(err)\n}\nio.println(\"after\")",
            &config,
        );
        assert!(succeeded);
        assert_eq!(output, "Max recursion depth exceeded\nafter\n");
    });
}

#[test]
fn test_default_recursion_ceiling_is_reported() {
    on_spawned_thread(|| {
        let (succeeded, output) = run_with(
            "fn forever(n) {\n    return forever(n + 1)\n}\nforever(0)",
            &InterpreterConfig::default(),
        );
        assert!(!succeeded);
        assert_eq!(
            output,
            "Runtime Error on line 2\n\tMax recursion depth exceeded: )\n"
        );
    });
}

#[test]
fn test_recursion_below_default_limit() {
    on_spawned_thread(|| {
        let (succeeded, output) = run_with(
            "fn depth(n) {\n    if n == 0 {\n        return 0\n    }\n    return 1 + depth(n - 1)\n}\nio.println(depth(990))",
            &InterpreterConfig::default(),
        );
        assert!(succeeded);
        assert_eq!(output, "990\n");
    });
}

// Imports

fn temp_dir(name: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("grotsky_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Paths embedded in grotsky string literals, where backslashes are escapes.
fn grotsky_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

const COUNTER_MODULE: &str = "let count = 0\nfn bump() {\n    count = count + 1\n    return count\n}\n";

#[test]
fn test_imports_are_isolated() -> Result<()> {
    let dir = temp_dir("import_isolated")?;
    let module = dir.join("counter.gr");
    std::fs::write(&module, COUNTER_MODULE)?;
    let module = grotsky_path(&module);

    let source = format!(
        "let a = import(\"{module}\")\nlet b = import(\"{module}\")\na.bump()\na.bump()\nio.println(a.bump(), b.bump())"
    );
    assert_eq!(run(&source), "3 1\n");
    Ok(())
}

#[test]
fn test_import_resolves_next_to_script() -> Result<()> {
    let dir = temp_dir("import_relative")?;
    std::fs::write(dir.join("counter.gr"), COUNTER_MODULE)?;
    std::fs::write(
        dir.join("greeter.gr"),
        "let counter = import(\"counter.gr\")\nfn greet(name) \"hello \" + name\nio.println(\"loading greeter\")\n",
    )?;

    let config = InterpreterConfig::default().with_path(&dir.join("main.gr"));
    let (succeeded, output) = run_with(
        "let greeter = import(\"greeter.gr\")\nio.println(greeter.greet(\"world\"), greeter.counter.bump())",
        &config,
    );
    assert!(succeeded);
    assert_eq!(output, "loading greeter\nhello world 1\n");
    Ok(())
}

#[test]
fn test_imported_modules_are_read_only() -> Result<()> {
    let dir = temp_dir("import_read_only")?;
    let module = dir.join("counter.gr");
    std::fs::write(&module, COUNTER_MODULE)?;
    let module = grotsky_path(&module);

    check_error(
        &format!("let a = import(\"{module}\")\na.count = 5"),
        "Trying to set a property on a Read-Only object: count",
        2,
    );
    Ok(())
}

#[test]
fn test_import_failures() -> Result<()> {
    let dir = temp_dir("import_failures")?;
    let broken = dir.join("broken.gr");
    std::fs::write(&broken, "let a = 1 +\n")?;
    let failing = dir.join("failing.gr");
    std::fs::write(&failing, "nil + 1\n")?;

    check_error(
        &format!("import(\"{}\")", grotsky_path(&dir.join("missing.gr"))),
        "import module error: )",
        1,
    );
    check_error(
        &format!("import(\"{}\")", grotsky_path(&broken)),
        "import module error: )",
        1,
    );
    check_statements(
        &format!(
            "let message = nil\ntry {{\n    import(\"{}\")\n}} catch err {{\n    message = err\n}}",
            grotsky_path(&failing)
        ),
        "message",
        "import module error",
    );
    Ok(())
}

// Property-based tests

fn operator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("+"), Just("-"), Just("*"), Just("/"), Just("%")]
}

fn apply(symbol: &str, lhs: f64, rhs: f64) -> f64 {
    match symbol {
        "+" => lhs + rhs,
        "-" => lhs - rhs,
        "*" => lhs * rhs,
        "/" => lhs / rhs,
        _ => lhs % rhs,
    }
}

proptest! {
    #[test]
    fn arithmetic_matches_f64(
        lhs in 0u32..100_000,
        rhs in 1u32..100_000,
        symbol in operator_strategy(),
    ) {
        let output = run(&format!("io.println({lhs} {symbol} {rhs})"));
        let expected = apply(symbol, lhs as f64, rhs as f64);
        prop_assert_eq!(output, format!("{expected}\n"));
    }

    #[test]
    fn string_concatenation_and_length(lhs in "[a-zA-Z0-9 ]*", rhs in "[a-zA-Z0-9 ]*") {
        let output = run(&format!("let s = \"{lhs}\" + \"{rhs}\"\nio.println(s, s.length)"));
        prop_assert_eq!(output, format!("{lhs}{rhs} {}\n", lhs.len() + rhs.len()));
    }
}

// Data driven tests

struct TestCase {
    name: String,
    source: String,
    expected: String,
}

/// `# expect: text` adds an output line. `# expect runtime error: message` adds the diagnostic
/// for the line it is written on.
fn parse_test_case(path: &Path) -> Result<TestCase> {
    let source = std::fs::read_to_string(path)?;
    let mut expected = String::new();
    for (index, line) in source.lines().enumerate() {
        if let Some((_, output)) = line.split_once("# expect: ") {
            expected.push_str(output);
            expected.push('\n');
        } else if let Some((_, message)) = line.split_once("# expect runtime error: ") {
            expected.push_str(&format!("Runtime Error on line {}\n\t{message}\n", index + 1));
        }
    }
    Ok(TestCase {
        name: path.display().to_string(),
        source,
        expected,
    })
}

fn test_engine(dir: &str) -> Result<()> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<_>>()?;
    paths.retain(|path| path.extension().is_some_and(|extension| extension == "gr"));
    paths.sort();
    assert!(!paths.is_empty(), "No test programs found in {dir}");

    for path in paths {
        let case = parse_test_case(&path)?;
        let config = InterpreterConfig::default().with_path(&path);
        let (_, output) = run_with(&case.source, &config);
        assert_eq!(output, case.expected, "Failed the test {}", case.name);
    }
    Ok(())
}

#[test]
fn test_programs() -> Result<()> {
    test_engine(concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/interpreter"))
}
