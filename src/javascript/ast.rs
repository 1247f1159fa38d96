use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        name: Identifier,
        value: Option<Expression>,
    },
    Return(Option<Expression>),
    Block(Block),
    // Absent when the leading token starts no expression
    Expression(Option<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Literals
    Identifier(Identifier),
    Number(f64),
    String(String),
    Boolean(bool),

    Prefix {
        op: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        op: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    // `a.b`; the right side is always a bare name
    Property {
        object: Box<Expression>,
        property: Identifier,
    },
    Function {
        params: Vec<Identifier>,
        body: Block,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Not,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOperator::Not => write!(f, "!"),
            PrefixOperator::Negative => write!(f, "-"),
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Equal => "==",
            InfixOperator::NotEqual => "!=",
            InfixOperator::LessThan => "<",
            InfixOperator::GreaterThan => ">",
            InfixOperator::LessThanEqual => "<=",
            InfixOperator::GreaterThanEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

impl Statement {
    /// Short label used by debug tracing.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Let { .. } => "let",
            Statement::Return(_) => "return",
            Statement::Block(_) => "block",
            Statement::Expression(_) => "expression",
        }
    }
}

impl Expression {
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Identifier(_) => "identifier",
            Expression::Number(_) => "number",
            Expression::String(_) => "string",
            Expression::Boolean(_) => "boolean",
            Expression::Prefix { .. } => "prefix",
            Expression::Infix { .. } => "infix",
            Expression::Property { .. } => "property",
            Expression::Function { .. } => "function",
            Expression::Call { .. } => "call",
            Expression::If { .. } => "if",
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::Number(n) => write!(f, "{}", n),
            Expression::String(s) => write!(f, "\"{}\"", s),
            Expression::Boolean(b) => write!(f, "{}", b),
            Expression::Prefix { op, right } => write!(f, "({}{})", op, right),
            Expression::Infix { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expression::Property { object, property } => write!(f, "({}.{})", object, property),
            Expression::Function { params, body } => write!(f, "fn({}) {}", join(params), body),
            Expression::Call { callee, arguments } => write!(f, "{}({})", callee, join(arguments)),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value: Some(value) } => write!(f, "let {} = {};", name, value),
            Statement::Let { name, value: None } => write!(f, "let {} = ;", name),
            Statement::Return(Some(value)) => write!(f, "return {};", value),
            Statement::Return(None) => write!(f, "return;"),
            Statement::Block(block) => write!(f, "{}", block),
            Statement::Expression(Some(expr)) => write!(f, "{}", expr),
            Statement::Expression(None) => Ok(()),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.statements.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", rendered.join(" "))
    }
}
