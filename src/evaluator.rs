use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use indexmap::IndexMap;
use tracing::trace;
use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::builtin::BuiltinFunction;
use crate::object::{HashKey, KeyValue, Object};
use crate::environment::Environment;

/// How many Monkey function calls may be active at once. Every call costs
/// several native frames; a session on [`crate::repl::STACK_SIZE`] stays
/// well clear of overflowing at this depth, even in debug builds.
pub const MAX_CALL_DEPTH: usize = 200;

/// How deeply expression evaluation may recurse, counted across calls.
/// Bounds recursion whose function bodies nest deeply.
pub const MAX_EVAL_DEPTH: usize = 2000;

/// Tree-walking evaluator. Bindings made by `let` live as long as the
/// evaluator does, so one instance can serve a whole interactive session.
pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
    depth: usize,
    nesting: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            env: Rc::new(RefCell::new(Environment::new())),
            depth: 0,
            nesting: 0,
        }
    }

    fn from(env: Environment, depth: usize, nesting: usize) -> Self {
        Self {
            env: Rc::new(RefCell::new(env)),
            depth,
            nesting,
        }
    }

    pub fn get(&self, key: &str) -> Option<Object> {
        self.env.borrow().get(key)
    }

    fn set(&mut self, key: String, value: Object) {
        self.env.borrow_mut().set(key, value)
    }

    /// Evaluates every statement of `program` in order.
    ///
    /// Returns `None` when there is no value to show: an empty program, or one
    /// whose last statement is a `let`. Runtime failures are never `None`;
    /// they come back as [`Object::Error`].
    pub fn eval(&mut self, program: &Program) -> Option<Object> {
        let mut result = None;

        for stmt in &program.statements {
            result = self.eval_statement(stmt);

            match result {
                Some(Object::ReturnValue(ret)) => return Some(*ret),
                Some(Object::Error(_)) => return result,
                _ => {}
            }
        }
        result
    }

    fn eval_block_statement(&mut self, block: &BlockStatement) -> Option<Object> {
        let mut result = None;

        for stmt in &block.statements {
            result = self.eval_statement(stmt);

            if let Some(Object::ReturnValue(_) | Object::Error(_)) = result {
                return result;
            }
        }

        result
    }

    fn eval_statement(&mut self, stmt: &Statement) -> Option<Object> {
        match stmt {
            Statement::ExpressionStatement(exp) => Some(self.eval_expression(exp)),
            Statement::ReturnStatement(r) => {
                let val = self.eval_expression(r);
                if val.is_error() {
                    return Some(val);
                }
                Some(Object::ReturnValue(Box::new(val)))
            }
            Statement::LetStatement { name, value } => {
                let val = self.eval_expression(value);
                if val.is_error() {
                    return Some(val);
                }
                self.set(name.clone(), val);
                None
            }
        }
    }

    fn eval_expression(&mut self, exp: &Expression) -> Object {
        if self.nesting >= MAX_EVAL_DEPTH {
            return new_error(format!("stack overflow: max nesting depth {} exceeded", MAX_EVAL_DEPTH));
        }
        self.nesting += 1;
        let result = self.eval_nested_expression(exp);
        self.nesting -= 1;
        result
    }

    fn eval_nested_expression(&mut self, exp: &Expression) -> Object {
        match exp {
            Expression::Integer(i) => Object::Integer(*i),
            Expression::String(s) => Object::String(s.clone()),
            Expression::Boolean(b) => Object::Boolean(*b),
            Expression::PrefixExpression { operation, right } => {
                let right = self.eval_expression(right);
                if right.is_error() {
                    return right;
                }
                eval_prefix_expression(operation, right)
            },
            Expression::InfixExpression { operation, left, right } => {
                let left = self.eval_expression(left);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(right);
                if right.is_error() {
                    return right;
                }
                eval_infix_expression(operation, left, right)
            },
            Expression::IfExpression { condition, consequence, alternative } => {
                let condition = self.eval_expression(condition);
                if condition.is_error() {
                    return condition;
                }

                let branch = if condition.is_truthy() {
                    Some(consequence)
                } else {
                    alternative.as_ref()
                };
                branch
                    .and_then(|block| self.eval_block_statement(block))
                    .unwrap_or(Object::Null)
            },
            Expression::Identifier(s) => self.eval_identifier(s),
            Expression::Function { parameters, body } => {
                Object::Function {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    env: Rc::clone(&self.env),
                }
            },
            Expression::CallExpression { function, arguments } => {
                let function = self.eval_expression(function);
                if function.is_error() {
                    return function;
                }
                match self.eval_expressions(arguments) {
                    Ok(args) => self.apply_function(function, args),
                    Err(err) => err,
                }
            },
            Expression::Array(exps) => match self.eval_expressions(exps) {
                Ok(elements) => Object::Array(elements),
                Err(err) => err,
            },
            Expression::IndexExpression { left, index } => {
                let left = self.eval_expression(left);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(index);
                if index.is_error() {
                    return index;
                }
                eval_index_expression(left, index)
            },
            Expression::Hash(pairs) => self.eval_hash_literal(pairs),
        }
    }

    fn eval_identifier(&self, identifier: &str) -> Object {
        match self.get(identifier) {
            Some(obj) => obj,
            None => match BuiltinFunction::look_up(identifier) {
                Some(builtin) => Object::Builtin(builtin),
                None => new_error(format!("identifier not found: {}", identifier))
            }
        }
    }

    /// Stops at the first error and hands it back as `Err`.
    fn eval_expressions(&mut self, exps: &[Expression]) -> Result<Vec<Object>, Object> {
        let mut result = Vec::with_capacity(exps.len());

        for exp in exps {
            let evaluated = self.eval_expression(exp);
            if evaluated.is_error() {
                return Err(evaluated);
            }
            result.push(evaluated);
        }
        Ok(result)
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expression, Expression)]) -> Object {
        let mut hash = IndexMap::<HashKey, KeyValue>::new();
        for (key, value) in pairs {
            let key = self.eval_expression(key);
            if key.is_error() {
                return key;
            }

            let hashed_key = match HashKey::from_object(&key) {
                Some(k) => k,
                None => return new_error(format!("unusable as hash key: {}", key.type_name())),
            };

            let value = self.eval_expression(value);
            if value.is_error() {
                return value;
            }

            hash.insert(hashed_key, KeyValue { key, value });
        }
        Object::Hash(hash)
    }

    fn apply_function(&self, function: Object, args: Vec<Object>) -> Object {
        match function {
            Object::Function { parameters, body, env } => {
                if parameters.len() != args.len() {
                    return new_error(format!("wrong number of arguments: want={}, got={}",
                        parameters.len(), args.len()));
                }
                if self.depth >= MAX_CALL_DEPTH {
                    return new_error(format!("stack overflow: max call depth {} exceeded", MAX_CALL_DEPTH));
                }
                trace!(arity = args.len(), depth = self.depth + 1, "applying function");

                let mut eval = Evaluator::from(Environment::enclosed(env), self.depth + 1, self.nesting);
                for (param, arg) in parameters.into_iter().zip(args) {
                    eval.set(param, arg);
                }

                let result = match eval.eval_block_statement(&body) {
                    None => Object::Null,
                    Some(Object::ReturnValue(ret)) => *ret,
                    Some(other) => other,
                };
                // Nothing outside the call can see its environment unless the
                // result does. Dropping the bindings frees closures made here.
                if !can_reach(&result, &eval.env) {
                    release(&eval.env);
                }
                result
            }
            Object::Builtin(bf) => {
                trace!(builtin = bf.name(), "applying builtin");
                bf.call(args)
            },
            other => new_error(format!("not a function: {}", other.type_name())),
        }
    }
}

impl Drop for Evaluator {
    fn drop(&mut self) {
        // Call evaluators are released by `apply_function`.
        if self.depth == 0 {
            release(&self.env);
        }
    }
}

fn release(env: &Rc<RefCell<Environment>>) {
    let bindings = env.borrow_mut().take_bindings();
    drop(bindings);
}

fn push_closure_envs(obj: &Object, envs: &mut Vec<Rc<RefCell<Environment>>>) {
    let mut pending = vec![obj];
    while let Some(obj) = pending.pop() {
        match obj {
            Object::Function { env, .. } => envs.push(Rc::clone(env)),
            Object::ReturnValue(inner) => pending.push(inner),
            Object::Array(items) => pending.extend(items.iter()),
            Object::Hash(pairs) => pending.extend(pairs.values().map(|kv| &kv.value)),
            _ => {}
        }
    }
}

/// Whether `env` is reachable from `obj` through closures, their bindings
/// and their outer environments.
fn can_reach(obj: &Object, env: &Rc<RefCell<Environment>>) -> bool {
    let mut pending = Vec::new();
    push_closure_envs(obj, &mut pending);

    let mut seen = HashSet::new();
    while let Some(next) = pending.pop() {
        if Rc::ptr_eq(&next, env) {
            return true;
        }
        if !seen.insert(Rc::as_ptr(&next)) {
            continue;
        }
        let scope = next.borrow();
        for value in scope.values() {
            push_closure_envs(value, &mut pending);
        }
        if let Some(outer) = scope.outer() {
            pending.push(Rc::clone(outer));
        }
    }
    false
}

pub fn new_error(msg: String) -> Object {
    Object::Error(msg)
}

fn eval_prefix_expression(operation: &str, right: Object) -> Object {
    match operation {
        "!" => Object::Boolean(!right.is_truthy()),
        "-" => match right {
            Object::Integer(i) => Object::Integer(i.wrapping_neg()),
            _ => new_error(format!("unknown operator: -{}", right.type_name())),
        },
        _ => new_error(format!("unknown operator: {}{}", operation, right.type_name())),
    }
}

fn eval_infix_expression(operation: &str, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operation, *l, *r),
        (Object::String(l), Object::String(r)) => eval_string_infix_expression(operation, l, r),
        _ => match operation {
            "==" => Object::Boolean(objects_equal(&left, &right)),
            "!=" => Object::Boolean(!objects_equal(&left, &right)),
            _ if left.type_name() != right.type_name() => new_error(format!("type mismatch: {} {} {}",
                left.type_name(), operation, right.type_name())),
            _ => new_error(format!("unknown operator: {} {} {}",
                left.type_name(), operation, right.type_name())),
        }
    }
}

/// Equality for operands that are not both integers or both strings.
fn objects_equal(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Boolean(l), Object::Boolean(r)) => l == r,
        (Object::Null, Object::Null) => true,
        _ => false,
    }
}

fn eval_integer_infix_expression(operation: &str, left: i64, right: i64) -> Object {
    match operation {
        "+" => Object::Integer(left.wrapping_add(right)),
        "-" => Object::Integer(left.wrapping_sub(right)),
        "*" => Object::Integer(left.wrapping_mul(right)),
        "/" => if right == 0 {
            new_error("division by zero".to_string())
        } else {
            Object::Integer(left.wrapping_div(right))
        },
        "<" => Object::Boolean(left < right),
        ">" => Object::Boolean(left > right),
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),
        _ => new_error(format!("unknown operator: INTEGER {} INTEGER", operation))
    }
}

fn eval_string_infix_expression(operation: &str, left: &str, right: &str) -> Object {
    match operation {
        "+" => Object::String(format!("{}{}", left, right)),
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),
        _ => new_error(format!("unknown operator: STRING {} STRING", operation))
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(arr), Object::Integer(i)) => {
            usize::try_from(*i).ok()
                .and_then(|i| arr.get(i))
                .cloned()
                .unwrap_or(Object::Null)
        },
        (Object::Hash(hash), _) => match HashKey::from_object(&index) {
            Some(key) => hash.get(&key).map(|kv| kv.value.clone()).unwrap_or(Object::Null),
            None => new_error(format!("unusable as hash key: {}", index.type_name())),
        },
        _ => new_error(format!("index operator not supported: {}", left.type_name())),
    }
}
