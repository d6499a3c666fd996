use std::cell::RefCell;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;
use indexmap::IndexMap;
use crate::ast::BlockStatement;
use crate::builtin::BuiltinFunction;
use crate::environment::Environment;

/// Key of a hash object. Only integers, strings and booleans can be keys.
#[derive(Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum HashKey {
    Integer(i64),
    String(String),
    Boolean(bool),
}

impl HashKey {
    pub fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Integer(i) => Some(HashKey::Integer(*i)),
            Object::String(st) => Some(HashKey::String(st.clone())),
            Object::Boolean(b) => Some(HashKey::Boolean(*b)),
            _ => None,
        }
    }
}

/// The evaluated key is kept next to the value so the hash can be
/// shown the way it was written.
#[derive(Clone)]
pub struct KeyValue {
    pub key: Object,
    pub value: Object,
}

#[derive(Clone)]
pub enum Object {
    Integer(i64),
    String(String),
    Boolean(bool),
    Null,
    ReturnValue(Box<Object>),
    Error(String),
    Function{
        parameters: Vec<String>,
        body: BlockStatement,
        env: Rc<RefCell<Environment>>,
    },
    Builtin(BuiltinFunction),
    Array(Vec<Object>),
    Hash(IndexMap<HashKey, KeyValue>)
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::String(_) => "STRING",
            Object::Boolean(_) => "BOOLEAN",
            Object::Null => "NULL",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
            Object::Function { .. } => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Null => false,
            Object::Boolean(b) => *b,
            _ => true,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(i) => write!(f, "{}", i),
            Object::String(s) => write!(f, "{}", s),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::Null => write!(f, "null"),
            Object::ReturnValue(obj) => write!(f, "{}", obj),
            Object::Error(msg) => write!(f, "ERROR: {}", msg),
            Object::Function { parameters, body, .. } => {
                write!(f, "fn({}) {{\n{}\n}}", parameters.join(", "), body)
            },
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Array(arr) => write!(f, "[{}]",
                arr.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")),
            Object::Hash(hash) => write!(f, "{{{}}}",
                hash.values().map(|kv| format!("{}: {}", kv.key, kv.value)).collect::<Vec<_>>().join(", ")),
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;
    use indexmap::IndexMap;
    use crate::ast::{BlockStatement, Expression, Statement};
    use crate::environment::Environment;
    use crate::object::{HashKey, KeyValue, Object};

    #[test]
    fn test_inspect() {
        let mut hash = IndexMap::new();
        for (k, v) in [(Object::String("b".to_string()), Object::Integer(2)), (Object::Boolean(true), Object::Null)] {
            let key = HashKey::from_object(&k).unwrap();
            hash.insert(key, KeyValue { key: k, value: v });
        }

        let tests = vec![
            (Object::Integer(-3), "-3"),
            (Object::Boolean(false), "false"),
            (Object::Null, "null"),
            (Object::String("hi there".to_string()), "hi there"),
            (Object::Error("type mismatch: INTEGER + BOOLEAN".to_string()), "ERROR: type mismatch: INTEGER + BOOLEAN"),
            (Object::Array(vec![Object::Integer(1), Object::String("a".to_string())]), "[1, a]"),
            (Object::Hash(hash), "{b: 2, true: null}"),
        ];

        for (obj, expected) in tests {
            assert_eq!(obj.to_string(), expected);
        }
    }

    #[test]
    fn test_function_inspect() {
        let func = Object::Function {
            parameters: vec!["x".to_string()],
            body: BlockStatement {
                statements: vec![Statement::ExpressionStatement(Expression::Identifier("x".to_string()))],
            },
            env: Rc::new(RefCell::new(Environment::new())),
        };
        assert_eq!(func.to_string(), "fn(x) {\nx\n}");
        assert_eq!(func.type_name(), "FUNCTION");
        assert!(HashKey::from_object(&func).is_none());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Object::Null.is_truthy());
        assert!(!Object::Boolean(false).is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::String(String::new()).is_truthy());
    }
}
