use std::fmt;
use std::fmt::Formatter;
use crate::evaluator::new_error;
use crate::object::Object;

pub type BuiltinFn = fn(args: Vec<Object>) -> Object;

#[derive(Clone, Debug)]
pub struct BuiltinFunction {
    name: &'static str,
    func: BuiltinFn
}

impl fmt::Display for BuiltinFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn wrong_arg_count(got: usize, want: usize) -> Object {
    new_error(format!("wrong number of arguments. got={}, want={}", got, want))
}

fn array_arg<'a>(name: &str, args: &'a [Object]) -> Result<&'a Vec<Object>, Object> {
    match &args[0] {
        Object::Array(arr) => Ok(arr),
        other => Err(new_error(format!("argument to `{}` must be ARRAY, got {}", name, other.type_name()))),
    }
}

impl BuiltinFunction {
    pub fn look_up(name: &str) -> Option<Self> {
        let (name, func): (&'static str, BuiltinFn) = match name {
            "len" => ("len", |args: Vec<Object>| {
                if args.len() != 1 {
                    return wrong_arg_count(args.len(), 1);
                }
                match &args[0] {
                    Object::String(s) => Object::Integer(s.chars().count() as i64),
                    Object::Array(v) => Object::Integer(v.len() as i64),
                    Object::Hash(h) => Object::Integer(h.len() as i64),
                    other => new_error(format!("argument to `len` not supported, got {}", other.type_name())),
                }
            }),
            "first" => ("first", |args: Vec<Object>| {
                if args.len() != 1 {
                    return wrong_arg_count(args.len(), 1);
                }
                match array_arg("first", &args) {
                    Ok(arr) => arr.first().cloned().unwrap_or(Object::Null),
                    Err(err) => err,
                }
            }),
            "last" => ("last", |args: Vec<Object>| {
                if args.len() != 1 {
                    return wrong_arg_count(args.len(), 1);
                }
                match array_arg("last", &args) {
                    Ok(arr) => arr.last().cloned().unwrap_or(Object::Null),
                    Err(err) => err,
                }
            }),
            "rest" => ("rest", |args: Vec<Object>| {
                if args.len() != 1 {
                    return wrong_arg_count(args.len(), 1);
                }
                match array_arg("rest", &args) {
                    Ok(arr) if arr.is_empty() => Object::Null,
                    Ok(arr) => Object::Array(arr[1..].to_vec()),
                    Err(err) => err,
                }
            }),
            "push" => ("push", |args: Vec<Object>| {
                if args.len() != 2 {
                    return wrong_arg_count(args.len(), 2);
                }
                match array_arg("push", &args) {
                    Ok(arr) => {
                        let mut pushed = arr.clone();
                        pushed.push(args[1].clone());
                        Object::Array(pushed)
                    },
                    Err(err) => err,
                }
            }),
            _ => return None,
        };
        Some(Self { name, func })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: Vec<Object>) -> Object {
        (self.func)(args)
    }
}
