use super::{
    expression::{Access, Expression, LiteralValue},
    statement::{FunctionBody, FunctionDecl, Statement},
};

const INDENT: &str = "    ";

pub trait ProgramFormatter {
    fn format(&self, program: &[Statement]) -> String;
}

pub struct DebugFormatter;

impl ProgramFormatter for DebugFormatter {
    fn format(&self, program: &[Statement]) -> String {
        format!("{program:#?}")
    }
}

/// Renders a program back into source text that parses to the same tree.
pub struct SourceFormatter;

impl ProgramFormatter for SourceFormatter {
    fn format(&self, program: &[Statement]) -> String {
        let mut buffer = String::new();
        for statement in program {
            buffer.push_str(&self.format_statement(statement, 0));
            buffer.push('\n');
        }
        buffer
    }
}

impl SourceFormatter {
    pub fn format_statement(&self, statement: &Statement, depth: usize) -> String {
        match statement {
            Statement::Expression(expression) => self.format_expression(expression, depth),
            Statement::TryCatch {
                body,
                name,
                handler,
            } => format!(
                "try {} catch {} {}",
                self.format_statement(body, depth),
                name.lexeme,
                self.format_statement(handler, depth)
            ),
            Statement::ClassicFor {
                initializer,
                condition,
                increment,
                body,
                ..
            } => {
                let initializer = initializer
                    .as_ref()
                    .map(|initializer| self.format_statement(initializer, depth))
                    .unwrap_or_default();
                format!(
                    "for {initializer}; {}; {} {}",
                    self.format_expression(condition, depth),
                    self.format_expression(increment, depth),
                    self.format_statement(body, depth)
                )
            }
            Statement::EnhancedFor {
                identifiers,
                collection,
                body,
                ..
            } => {
                let identifiers: Vec<&str> = identifiers
                    .iter()
                    .map(|identifier| identifier.lexeme.as_str())
                    .collect();
                format!(
                    "for {} in {} {}",
                    identifiers.join(", "),
                    self.format_expression(collection, depth),
                    self.format_statement(body, depth)
                )
            }
            Statement::Let { name, initializer } => match initializer {
                Some(initializer) => format!(
                    "let {} = {}",
                    name.lexeme,
                    self.format_expression(initializer, depth)
                ),
                None => format!("let {}", name.lexeme),
            },
            Statement::Block(statements) => self.format_block(statements, depth),
            Statement::While {
                condition, body, ..
            } => format!(
                "while {} {}",
                self.format_expression(condition, depth),
                self.format_statement(body, depth)
            ),
            Statement::Return { value, .. } => match value {
                Some(value) => format!("return {}", self.format_expression(value, depth)),
                None => "return".into(),
            },
            Statement::Break(_) => "break".into(),
            Statement::Continue(_) => "continue".into(),
            Statement::If {
                condition,
                then_branch,
                elifs,
                else_branch,
                ..
            } => {
                let mut buffer = format!(
                    "if {} {}",
                    self.format_expression(condition, depth),
                    self.format_block(then_branch, depth)
                );
                for elif in elifs {
                    buffer.push_str(&format!(
                        " elif {} {}",
                        self.format_expression(&elif.condition, depth),
                        self.format_block(&elif.body, depth)
                    ));
                }
                if let Some(else_branch) = else_branch {
                    buffer.push_str(&format!(" else {}", self.format_block(else_branch, depth)));
                }
                buffer
            }
            Statement::Function(declaration) => {
                format!("fn {}", self.format_function(declaration, depth))
            }
            Statement::Class(declaration) => {
                let mut buffer = format!("class {}", declaration.name.lexeme);
                if let Some(super_class) = &declaration.super_class {
                    buffer.push_str(&format!(" < {}", super_class.lexeme));
                }
                buffer.push_str(" {\n");
                let indent = INDENT.repeat(depth + 1);
                for method in &declaration.methods {
                    buffer.push_str(&format!(
                        "{indent}{}\n",
                        self.format_function(method, depth + 1)
                    ));
                }
                for method in &declaration.static_methods {
                    buffer.push_str(&format!(
                        "{indent}class {}\n",
                        self.format_function(method, depth + 1)
                    ));
                }
                buffer.push_str(&INDENT.repeat(depth));
                buffer.push('}');
                buffer
            }
        }
    }

    fn format_block(&self, statements: &[Statement], depth: usize) -> String {
        let indent = INDENT.repeat(depth + 1);
        let mut buffer = String::from("{\n");
        for statement in statements {
            buffer.push_str(&indent);
            buffer.push_str(&self.format_statement(statement, depth + 1));
            buffer.push('\n');
        }
        buffer.push_str(&INDENT.repeat(depth));
        buffer.push('}');
        buffer
    }

    /// `name(parameters) body`, without the leading `fn`.
    fn format_function(&self, declaration: &FunctionDecl, depth: usize) -> String {
        let name = declaration
            .name
            .as_ref()
            .map(|name| name.lexeme.as_str())
            .unwrap_or_default();
        let parameters: Vec<&str> = declaration
            .parameters
            .iter()
            .map(|parameter| parameter.lexeme.as_str())
            .collect();
        let body = match &declaration.body {
            FunctionBody::Block(statements) => self.format_block(statements, depth),
            FunctionBody::Expression(expression) => self.format_expression(expression, depth),
        };
        format!("{name}({}) {body}", parameters.join(", "))
    }

    pub fn format_expression(&self, expression: &Expression, depth: usize) -> String {
        match expression {
            Expression::List { elements, .. } => {
                format!("[{}]", self.format_list(elements, depth))
            }
            Expression::Dict { entries, .. } => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| {
                        format!(
                            "{}: {}",
                            self.format_expression(key, depth),
                            self.format_expression(value, depth)
                        )
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Expression::Assign {
                name,
                value,
                access,
            } => {
                let target = match access {
                    Some(access) => self.format_access(access, depth),
                    None => name.lexeme.to_string(),
                };
                format!("{target} = {}", self.format_expression(value, depth))
            }
            Expression::Access(access) => self.format_access(access, depth),
            Expression::Binary {
                left,
                operator,
                right,
            }
            | Expression::Logical {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                self.format_operand(left, depth),
                operator.lexeme,
                self.format_operand(right, depth)
            ),
            Expression::Call {
                callee, arguments, ..
            } => format!(
                "{}({})",
                self.format_expression(callee, depth),
                self.format_list(arguments, depth)
            ),
            Expression::Get { object, name } => {
                format!("{}.{}", self.format_expression(object, depth), name.lexeme)
            }
            Expression::Set {
                object,
                name,
                value,
                access,
            } => {
                let target = match access {
                    Some(access) => self.format_access(access, depth),
                    None => format!("{}.{}", self.format_expression(object, depth), name.lexeme),
                };
                format!("{target} = {}", self.format_expression(value, depth))
            }
            Expression::Super { method, .. } => format!("super.{}", method.lexeme),
            Expression::Grouping(inner) => format!("({})", self.format_expression(inner, depth)),
            Expression::Literal(literal) => match literal {
                LiteralValue::Number(value) => format!("{value}"),
                LiteralValue::String(value) => format!("\"{}\"", escape(value)),
                LiteralValue::Bool(value) => format!("{value}"),
                LiteralValue::Nil => "nil".into(),
            },
            Expression::This(_) => "this".into(),
            Expression::Unary { operator, operand } => match operator.lexeme.as_str() {
                "not" => format!("not {}", self.format_operand(operand, depth)),
                lexeme => format!("{lexeme}{}", self.format_operand(operand, depth)),
            },
            Expression::Variable(name) => name.lexeme.to_string(),
            Expression::Function(declaration) => {
                format!("fn {}", self.format_function(declaration, depth))
            }
        }
    }

    fn format_operand(&self, expression: &Expression, depth: usize) -> String {
        match expression {
            Expression::Binary { .. } | Expression::Logical { .. } | Expression::Assign { .. } => {
                format!("({})", self.format_expression(expression, depth))
            }
            _ => self.format_expression(expression, depth),
        }
    }

    fn format_list(&self, expressions: &[Expression], depth: usize) -> String {
        let expressions: Vec<String> = expressions
            .iter()
            .map(|expression| self.format_expression(expression, depth))
            .collect();
        expressions.join(", ")
    }

    fn format_access(&self, access: &Access, depth: usize) -> String {
        let component = |expression: &Option<Box<Expression>>| {
            expression
                .as_ref()
                .map(|expression| self.format_expression(expression, depth))
                .unwrap_or_default()
        };
        let mut buffer = format!("{}[", self.format_expression(&access.object, depth));
        buffer.push_str(&component(&access.first));
        if access.first_colon.is_some() {
            buffer.push(':');
            buffer.push_str(&component(&access.second));
        }
        if access.second_colon.is_some() {
            buffer.push(':');
            buffer.push_str(&component(&access.third));
        }
        buffer.push(']');
        buffer
    }
}

fn escape(value: &str) -> String {
    let mut buffer = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => buffer.push_str("\\\\"),
            '"' => buffer.push_str("\\\""),
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            '\t' => buffer.push_str("\\t"),
            '\u{7}' => buffer.push_str("\\a"),
            '\u{8}' => buffer.push_str("\\b"),
            '\u{b}' => buffer.push_str("\\v"),
            '\u{c}' => buffer.push_str("\\f"),
            c => buffer.push(c),
        }
    }
    buffer
}
