//! Lazy, memoized evaluation of template expressions.
//!
//! Parameters, derived values, resource inclusion and resource fields are
//! each computed on first use and cached, so evaluation order follows the
//! references between them rather than declaration order. A key that is
//! requested while it is still being computed is a cycle. The evaluate
//! phase forces every derived value once after expansion.
//!
//! While a value is computed the evaluator records which resource
//! instances it read. Those sets become the implicit dependency edges of
//! the resource the value ends up in.

mod functions;
mod ops;

use std::collections::HashMap;

use gamehost_ir::{RuntimeRef, Value};
use gamehost_template::{
    Scope, Template,
    expr::{Expr, Segment, TemplateValue},
};
use indexmap::IndexSet;

use crate::{ResolveError, Result};

/// One concrete instance of a resource declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub symbol: String,
    /// Position in the `for_each` array, for loop resources.
    pub index: Option<usize>,
    pub item: Option<Value>,
    pub included: bool,
}

impl Instance {
    /// Node id: the symbol, or `symbol[index]` for loop instances.
    pub fn id(&self) -> String {
        match self.index {
            Some(index) => format!("{}[{}]", self.symbol, index),
            None => self.symbol.clone(),
        }
    }
}

/// Where an expression is evaluated: the error location and, inside a
/// resource, the instance and its loop variables.
#[derive(Debug, Clone)]
pub(crate) struct Local {
    location: String,
    instance: Option<String>,
    item: Option<(Value, usize)>,
}

impl Local {
    pub(crate) fn global(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            instance: None,
            item: None,
        }
    }

    fn within(instance: &Instance, field: &str) -> Self {
        let id = instance.id();
        Self {
            location: format!("resources.{}.{}", id, field),
            instance: Some(id),
            item: instance.item.clone().zip(instance.index),
        }
    }

    pub(crate) fn location(&self) -> &str {
        &self.location
    }
}

#[derive(Debug, Clone)]
struct Memo {
    value: Value,
    touched: IndexSet<String>,
}

#[derive(Debug, Clone)]
struct Expansion {
    instances: Vec<Instance>,
    touched: IndexSet<String>,
}

/// A step in a postfix chain such as `a.b[0].c`.
#[derive(Debug, Clone, Copy)]
enum Accessor<'e> {
    Field(&'e str),
    Index(&'e Expr),
}

/// Split `a.b[0].c` into its root `a` and the accessors after it.
fn flatten(expr: &Expr) -> (&Expr, Vec<Accessor<'_>>) {
    let mut accessors = Vec::new();
    let mut current = expr;
    loop {
        match current {
            Expr::Member(base, field) => {
                accessors.push(Accessor::Field(field));
                current = base;
            }
            Expr::Index(base, index) => {
                accessors.push(Accessor::Index(index));
                current = base;
            }
            root => {
                accessors.reverse();
                return (root, accessors);
            }
        }
    }
}

pub(crate) struct Evaluator<'a> {
    template: &'a Template,
    scope: Scope,
    supplied: HashMap<String, Value>,
    parameters: HashMap<String, Memo>,
    variables: HashMap<String, Memo>,
    expansions: HashMap<String, Expansion>,
    /// Keyed by `(instance id, field)`; `name` holds the qualified name.
    fields: HashMap<(String, String), Memo>,
    /// Keys currently being computed, for cycle detection.
    stack: Vec<String>,
    /// Resource instances read by each computation in progress.
    frames: Vec<IndexSet<String>>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(template: &'a Template, scope: Scope) -> Self {
        Self {
            template,
            scope,
            supplied: HashMap::new(),
            parameters: HashMap::new(),
            variables: HashMap::new(),
            expansions: HashMap::new(),
            fields: HashMap::new(),
            stack: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Set the supplied parameter values. Values must already be checked.
    pub(crate) fn bind(&mut self, supplied: HashMap<String, Value>) {
        self.supplied = supplied;
        self.parameters.clear();
    }

    pub(crate) fn scope(&self) -> &Scope {
        &self.scope
    }

    fn touch(&mut self, id: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(id.to_string());
        }
    }

    fn merge(&mut self, touched: &IndexSet<String>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.extend(touched.iter().cloned());
        }
    }

    /// Compute a value under `key`, detecting cycles and recording the
    /// resources it reads.
    fn memoized<T>(
        &mut self,
        key: String,
        compute: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<(T, IndexSet<String>)> {
        if let Some(pos) = self.stack.iter().position(|k| *k == key) {
            let mut cycle: Vec<&str> = self.stack[pos..].iter().map(String::as_str).collect();
            cycle.push(&key);
            return Err(ResolveError::CyclicReference {
                cycle: cycle.join(" -> "),
            });
        }

        self.stack.push(key);
        self.frames.push(IndexSet::new());
        let result = compute(self);
        let touched = self.frames.pop().unwrap_or_default();
        self.stack.pop();
        result.map(|value| (value, touched))
    }

    /// Value of a parameter: the supplied value or its evaluated default.
    pub(crate) fn parameter(&mut self, name: &str) -> Result<Value> {
        if let Some(memo) = self.parameters.get(name).cloned() {
            self.merge(&memo.touched);
            return Ok(memo.value);
        }

        let (value, touched) =
            self.memoized(format!("parameters.{}", name), |this| this.compute_parameter(name))?;
        self.merge(&touched);
        self.parameters
            .insert(name.to_string(), Memo { value: value.clone(), touched });
        Ok(value)
    }

    fn compute_parameter(&mut self, name: &str) -> Result<Value> {
        let template = self.template;
        let Some(param) = template.parameters.get(name) else {
            return Err(ResolveError::UndeclaredReference {
                location: "parameters".to_string(),
                name: name.to_string(),
            });
        };

        if let Some(value) = self.supplied.get(name) {
            return Ok(value.clone());
        }

        let Some(default) = &param.default else {
            return Err(ResolveError::MissingRequiredParameter {
                name: name.to_string(),
            });
        };

        let local = Local::global(format!("parameters.{}.default", name));
        let value = self.eval_value(default, &local)?;
        if !value.conforms_to(param.ty) {
            return Err(ResolveError::type_mismatch(
                local.location(),
                format!(
                    "default for '{}' must be {}, found {}",
                    name,
                    param.ty,
                    value.type_name()
                ),
            ));
        }
        if let Some(message) = param.constraints.check(&value) {
            return Err(ResolveError::ConstraintViolation {
                name: name.to_string(),
                message,
            });
        }
        Ok(value)
    }

    /// Value of a derived value, computed on first use.
    pub(crate) fn variable(&mut self, name: &str) -> Result<Value> {
        if let Some(memo) = self.variables.get(name).cloned() {
            self.merge(&memo.touched);
            return Ok(memo.value);
        }

        let template = self.template;
        let Some(variable) = template.variables.get(name) else {
            return Err(ResolveError::UndeclaredReference {
                location: "variables".to_string(),
                name: name.to_string(),
            });
        };
        let location = format!("variables.{}", name);
        let (value, touched) = self.memoized(location.clone(), |this| {
            this.eval_value(&variable.value, &Local::global(location))
        })?;
        self.merge(&touched);
        self.variables
            .insert(name.to_string(), Memo { value: value.clone(), touched });
        Ok(value)
    }

    /// Instances of a resource declaration, with inclusion decided.
    pub(crate) fn instances(&mut self, symbol: &str) -> Result<Vec<Instance>> {
        if let Some(expansion) = self.expansions.get(symbol) {
            return Ok(expansion.instances.clone());
        }

        let (instances, touched) =
            self.memoized(format!("resources.{}", symbol), |this| this.expand(symbol))?;
        self.expansions.insert(
            symbol.to_string(),
            Expansion {
                instances: instances.clone(),
                touched,
            },
        );
        Ok(instances)
    }

    fn expand(&mut self, symbol: &str) -> Result<Vec<Instance>> {
        let template = self.template;
        let Some(resource) = template.resources.get(symbol) else {
            return Err(ResolveError::UndeclaredReference {
                location: "resources".to_string(),
                name: symbol.to_string(),
            });
        };

        let Some(for_each) = &resource.for_each else {
            let mut instance = Instance {
                symbol: symbol.to_string(),
                index: None,
                item: None,
                included: true,
            };
            instance.included = self.condition(resource.condition.as_ref(), &instance)?;
            return Ok(vec![instance]);
        };

        let local = Local::global(format!("resources.{}.for_each", symbol));
        let items = match self.eval_value(for_each, &local)? {
            Value::Array(items) => items,
            other => {
                return Err(ResolveError::type_mismatch(
                    local.location(),
                    format!("for_each must be an array, found {}", other.type_name()),
                ));
            }
        };

        let mut instances = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let mut instance = Instance {
                symbol: symbol.to_string(),
                index: Some(index),
                item: Some(item),
                included: true,
            };
            instance.included = self.condition(resource.condition.as_ref(), &instance)?;
            instances.push(instance);
        }
        Ok(instances)
    }

    fn condition(
        &mut self,
        condition: Option<&TemplateValue>,
        instance: &Instance,
    ) -> Result<bool> {
        self.eval_condition(condition, &Local::within(instance, "condition"))
    }

    /// Evaluate an optional gating condition; absent means included.
    pub(crate) fn eval_condition(
        &mut self,
        condition: Option<&TemplateValue>,
        local: &Local,
    ) -> Result<bool> {
        let Some(condition) = condition else {
            return Ok(true);
        };
        match self.eval_value(condition, local)? {
            Value::Bool(b) => Ok(b),
            other => Err(ResolveError::type_mismatch(
                local.location(),
                format!("condition must be a bool, found {}", other.type_name()),
            )),
        }
    }

    /// Fully qualified name of an instance, `parent/child` for children.
    pub(crate) fn full_name(&mut self, instance: &Instance) -> Result<String> {
        let value = self.instance_field(instance, "name", |this| {
            let template = this.template;
            let resource = &template.resources[&instance.symbol];
            let local = Local::within(instance, "name");
            let own = match this.eval_value(&resource.name, &local)? {
                Value::String(s) => s,
                other => {
                    return Err(ResolveError::type_mismatch(
                        local.location(),
                        format!(
                            "resource name must be a plain string, found {}",
                            other.type_name()
                        ),
                    ));
                }
            };

            let Some(parent) = &resource.parent else {
                return Ok(Value::String(own));
            };
            let parent_instance =
                this.single_instance(parent, &format!("resources.{}.parent", instance.id()))?;
            let parent_name = this.full_name(&parent_instance)?;
            Ok(Value::String(format!("{}/{}", parent_name, own)))
        })?;

        match value {
            Value::String(s) => Ok(s),
            other => Err(ResolveError::type_mismatch(
                &format!("resources.{}.name", instance.id()),
                format!("resource name must be a plain string, found {}", other.type_name()),
            )),
        }
    }

    /// The instance of a non-loop resource, which must be included.
    pub(crate) fn single_instance(&mut self, symbol: &str, location: &str) -> Result<Instance> {
        let template = self.template;
        if template.resources.get(symbol).is_some_and(|r| r.is_loop()) {
            return Err(ResolveError::type_mismatch(
                location,
                format!("'{}' is a for_each resource and cannot be a parent", symbol),
            ));
        }
        let instance = self
            .instances(symbol)?
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::UndeclaredReference {
                location: location.to_string(),
                name: symbol.to_string(),
            })?;
        if !instance.included {
            return Err(ResolveError::DanglingReference {
                location: location.to_string(),
                target: instance.id(),
            });
        }
        Ok(instance)
    }

    /// Fully qualified resource id, derived from the scope, type and name.
    pub(crate) fn resource_id(&mut self, instance: &Instance) -> Result<String> {
        let template = self.template;
        let resource = &template.resources[&instance.symbol];
        let name = self.full_name(instance)?;

        let mut types = resource.resource_type.split('/');
        let namespace = types.next().unwrap_or_default();
        let types: Vec<&str> = types.collect();
        let names: Vec<&str> = name.split('/').collect();
        if types.len() != names.len() {
            return Err(ResolveError::invalid_expression(
                &format!("resources.{}.name", instance.id()),
                format!(
                    "name '{}' has {} segment(s) but type '{}' expects {}",
                    name,
                    names.len(),
                    resource.resource_type,
                    types.len()
                ),
            ));
        }

        let mut id = format!("{}/providers/{}", self.scope.resource_group_id(), namespace);
        for (ty, name) in types.iter().zip(&names) {
            id.push('/');
            id.push_str(ty);
            id.push('/');
            id.push_str(name);
        }
        Ok(id)
    }

    /// Evaluated value of a top-level body field of an instance.
    pub(crate) fn field(&mut self, instance: &Instance, key: &str) -> Result<Value> {
        self.instance_field(instance, key, |this| {
            let template = this.template;
            let resource = &template.resources[&instance.symbol];
            match resource.body.get(key) {
                Some(value) => this.eval_value(value, &Local::within(instance, key)),
                None => Ok(Value::Null),
            }
        })
    }

    fn instance_field(
        &mut self,
        instance: &Instance,
        field: &str,
        compute: impl FnOnce(&mut Self) -> Result<Value>,
    ) -> Result<Value> {
        let key = (instance.id(), field.to_string());
        if let Some(memo) = self.fields.get(&key) {
            return Ok(memo.value.clone());
        }
        let (value, touched) =
            self.memoized(format!("resources.{}.{}", key.0, field), compute)?;
        self.fields.insert(key, Memo { value: value.clone(), touched });
        Ok(value)
    }

    /// Resource instances read while computing an instance, excluding itself.
    ///
    /// Only fields computed so far are included, so call this after the
    /// instance's name and body have been evaluated.
    pub(crate) fn references_of(&self, instance: &Instance) -> IndexSet<String> {
        let id = instance.id();
        let mut out = IndexSet::new();
        if let Some(expansion) = self.expansions.get(&instance.symbol) {
            out.extend(expansion.touched.iter().cloned());
        }

        let template = self.template;
        let resource = &template.resources[&instance.symbol];
        let fields = std::iter::once("name").chain(resource.body.keys().map(String::as_str));
        for field in fields {
            if let Some(memo) = self.fields.get(&(id.clone(), field.to_string())) {
                out.extend(memo.touched.iter().cloned());
            }
        }
        out.shift_remove(&id);
        out
    }

    /// Evaluate a template value against the parameters and resources.
    pub(crate) fn eval_value(&mut self, value: &TemplateValue, local: &Local) -> Result<Value> {
        match value {
            TemplateValue::Literal(v) => Ok(v.clone()),
            TemplateValue::Expr(expr) => self.eval(expr, local),
            TemplateValue::Interpolated(segments) => {
                let mut text = ops::TextBuilder::default();
                for segment in segments {
                    match segment {
                        Segment::Text(s) => text.push_str(s),
                        Segment::Expr(expr) => {
                            let value = self.eval(expr, local)?;
                            text.push(&value, local.location())?;
                        }
                    }
                }
                Ok(text.finish())
            }
            TemplateValue::Array(items) => items
                .iter()
                .map(|item| self.eval_value(item, local))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            TemplateValue::Object(map) => {
                let mut out = indexmap::IndexMap::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), self.eval_value(item, local)?);
                }
                Ok(Value::Object(out))
            }
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr, local: &Local) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => self.lookup(name, local),
            Expr::Member(..) | Expr::Index(..) => {
                let (root, accessors) = flatten(expr);
                if let Expr::Ident(name) = root
                    && self.is_resource(name, local)
                {
                    return self.read_resource(name, &accessors, local);
                }
                let base = self.eval(root, local)?;
                self.walk(base, None, &accessors, local)
            }
            Expr::Call(function, args) => functions::call(self, *function, args, local),
            Expr::Unary(op, operand) => {
                let value = self.eval(operand, local)?;
                ops::unary(*op, value, local.location())
            }
            Expr::Binary(op, lhs, rhs) => {
                use gamehost_template::expr::BinaryOp;
                match op {
                    BinaryOp::And | BinaryOp::Or => {
                        let left = self.eval_bool(lhs, local, op.symbol())?;
                        let short = matches!(op, BinaryOp::Or);
                        if left == short {
                            return Ok(Value::Bool(short));
                        }
                        Ok(Value::Bool(self.eval_bool(rhs, local, op.symbol())?))
                    }
                    _ => {
                        let left = self.eval(lhs, local)?;
                        let right = self.eval(rhs, local)?;
                        ops::binary(*op, left, right, local.location())
                    }
                }
            }
            Expr::Ternary(cond, then, otherwise) => {
                if self.eval_bool(cond, local, "?")? {
                    self.eval(then, local)
                } else {
                    self.eval(otherwise, local)
                }
            }
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item, local))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }

    fn eval_bool(&mut self, expr: &Expr, local: &Local, op: &str) -> Result<bool> {
        match self.eval(expr, local)? {
            Value::Bool(b) => Ok(b),
            other => Err(ResolveError::type_mismatch(
                local.location(),
                format!("operand of '{}' must be a bool, found {}", op, other.type_name()),
            )),
        }
    }

    fn is_loop_variable(name: &str, local: &Local) -> bool {
        local.item.is_some() && (name == "item" || name == "index")
    }

    fn is_resource(&self, name: &str, local: &Local) -> bool {
        !Self::is_loop_variable(name, local)
            && !self.template.parameters.contains_key(name)
            && !self.template.variables.contains_key(name)
            && self.template.resources.contains_key(name)
    }

    fn lookup(&mut self, name: &str, local: &Local) -> Result<Value> {
        if let Some((item, index)) = &local.item {
            match name {
                "item" => return Ok(item.clone()),
                "index" => return Ok(Value::Int(*index as i64)),
                _ => {}
            }
        }
        if self.template.parameters.contains_key(name) {
            return self.parameter(name);
        }
        if self.template.variables.contains_key(name) {
            return self.variable(name);
        }
        if self.template.resources.contains_key(name) {
            return self.read_resource(name, &[], local);
        }
        Err(ResolveError::UndeclaredReference {
            location: local.location().to_string(),
            name: name.to_string(),
        })
    }

    /// Pick the instance a postfix chain on a resource refers to. Loop
    /// resources take the first index accessor.
    fn select_instance<'e, 'r>(
        &mut self,
        symbol: &str,
        accessors: &'r [Accessor<'e>],
        local: &Local,
    ) -> Result<(Instance, &'r [Accessor<'e>])> {
        let instances = self.instances(symbol)?;
        let is_loop = self.template.resources[symbol].is_loop();

        let (instance, rest) = if is_loop {
            match accessors.split_first() {
                Some((Accessor::Index(index), rest)) => {
                    let index = self.eval_index(index, local)?;
                    let instance = usize::try_from(index)
                        .ok()
                        .and_then(|i| instances.get(i))
                        .cloned()
                        .ok_or_else(|| ResolveError::InvalidArrayIndex {
                            location: local.location().to_string(),
                            index,
                            len: instances.len(),
                        })?;
                    (instance, rest)
                }
                _ => {
                    return Err(ResolveError::type_mismatch(
                        local.location(),
                        format!(
                            "'{}' is a for_each resource; select an instance first, e.g. {}[0]",
                            symbol, symbol
                        ),
                    ));
                }
            }
        } else {
            let instance = instances.into_iter().next().ok_or_else(|| {
                ResolveError::UndeclaredReference {
                    location: local.location().to_string(),
                    name: symbol.to_string(),
                }
            })?;
            (instance, accessors)
        };

        if !instance.included {
            return Err(ResolveError::DanglingReference {
                location: local.location().to_string(),
                target: instance.id(),
            });
        }

        let id = instance.id();
        if local.instance.as_deref() != Some(id.as_str()) {
            self.touch(&id);
        }
        Ok((instance, rest))
    }

    /// Resolve an expression naming a resource instance, as passed to
    /// `listKeys` or `resourceId`.
    pub(crate) fn resource_argument(
        &mut self,
        expr: &Expr,
        function: &str,
        local: &Local,
    ) -> Result<Instance> {
        let (root, accessors) = flatten(expr);
        if let Expr::Ident(name) = root
            && self.is_resource(name, local)
        {
            let (instance, rest) = self.select_instance(name, &accessors, local)?;
            if rest.is_empty() {
                return Ok(instance);
            }
        }
        Err(ResolveError::type_mismatch(
            local.location(),
            format!("'{}' expects a resource, e.g. {}(storageAccount)", function, function),
        ))
    }

    fn read_resource(
        &mut self,
        symbol: &str,
        accessors: &[Accessor<'_>],
        local: &Local,
    ) -> Result<Value> {
        let (instance, rest) = self.select_instance(symbol, accessors, local)?;
        let Some((first, rest)) = rest.split_first() else {
            return Err(ResolveError::type_mismatch(
                local.location(),
                format!(
                    "resource '{}' cannot be used as a value; read a property such as {}.id",
                    instance.id(),
                    symbol
                ),
            ));
        };
        let Accessor::Field(field) = *first else {
            return Err(ResolveError::type_mismatch(
                local.location(),
                format!("resource '{}' cannot be indexed", instance.id()),
            ));
        };

        let template = self.template;
        let resource = &template.resources[symbol];
        let value = match field {
            "name" => Value::String(self.full_name(&instance)?),
            "id" => Value::String(self.resource_id(&instance)?),
            "type" => Value::String(resource.resource_type.clone()),
            "apiVersion" => Value::String(resource.api_version.clone()),
            key if resource.body.contains_key(key) => self.field(&instance, key)?,
            key => {
                let base = self.runtime_base(&instance, key)?;
                return self.runtime_path(base, rest, local);
            }
        };
        let base = self.runtime_base(&instance, field)?;
        self.walk(value, Some(base), rest, local)
    }

    /// Runtime expression for a top-level field of a deployed resource.
    fn runtime_base(&mut self, instance: &Instance, field: &str) -> Result<RuntimeRef> {
        let name = self.full_name(instance)?;
        if field == "properties" {
            return Ok(RuntimeRef::new(format!("reference('{}')", name)));
        }
        let api_version = &self.template.resources[&instance.symbol].api_version;
        Ok(
            RuntimeRef::new(format!("reference('{}', '{}', 'Full')", name, api_version))
                .member(field),
        )
    }

    fn runtime_path(
        &mut self,
        mut runtime: RuntimeRef,
        accessors: &[Accessor<'_>],
        local: &Local,
    ) -> Result<Value> {
        for accessor in accessors {
            runtime = match accessor {
                Accessor::Field(field) => runtime.member(field),
                Accessor::Index(index) => runtime.index(self.eval_index(index, local)?),
            };
        }
        Ok(Value::Runtime(runtime))
    }

    /// Apply accessors to a value. With a runtime base, fields missing from
    /// a declared object fall back to the deployed resource's runtime value.
    fn walk(
        &mut self,
        mut value: Value,
        mut runtime: Option<RuntimeRef>,
        accessors: &[Accessor<'_>],
        local: &Local,
    ) -> Result<Value> {
        for (pos, accessor) in accessors.iter().enumerate() {
            value = match (accessor, value) {
                (Accessor::Field(field), Value::Object(mut map)) => {
                    runtime = runtime.map(|r| r.member(field));
                    match (map.shift_remove(*field), runtime.take()) {
                        (Some(v), r) => {
                            runtime = r;
                            v
                        }
                        (None, Some(r)) => {
                            return self.runtime_path(r, &accessors[pos + 1..], local);
                        }
                        (None, None) => {
                            return Err(ResolveError::type_mismatch(
                                local.location(),
                                format!("object has no field '{}'", field),
                            ));
                        }
                    }
                }
                (Accessor::Field(field), Value::Runtime(r)) => Value::Runtime(r.member(field)),
                (Accessor::Index(index), Value::Array(mut items)) => {
                    let index = self.eval_index(index, local)?;
                    let len = items.len();
                    let i = usize::try_from(index)
                        .ok()
                        .filter(|i| *i < len)
                        .ok_or_else(|| ResolveError::InvalidArrayIndex {
                            location: local.location().to_string(),
                            index,
                            len,
                        })?;
                    runtime = runtime.map(|r| r.index(index));
                    items.swap_remove(i)
                }
                (Accessor::Index(index), Value::Runtime(r)) => {
                    Value::Runtime(r.index(self.eval_index(index, local)?))
                }
                (Accessor::Field(field), other) => {
                    return Err(ResolveError::type_mismatch(
                        local.location(),
                        format!("cannot read field '{}' of {}", field, other.type_name()),
                    ));
                }
                (Accessor::Index(_), other) => {
                    return Err(ResolveError::type_mismatch(
                        local.location(),
                        format!("cannot index {}", other.type_name()),
                    ));
                }
            };
        }
        Ok(value)
    }

    fn eval_index(&mut self, expr: &Expr, local: &Local) -> Result<i64> {
        match self.eval(expr, local)? {
            Value::Int(i) => Ok(i),
            other => Err(ResolveError::type_mismatch(
                local.location(),
                format!("index must be an int, found {}", other.type_name()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use gamehost_template::parse_template;

    use super::*;

    fn template(body: &str) -> Template {
        let src = format!("[template]\nname = \"test\"\nversion = \"1.0.0\"\n\n{}", body);
        parse_template(&src, "test.toml").unwrap()
    }

    fn variable(template: &Template, name: &str) -> Result<Value> {
        Evaluator::new(template, Scope::default()).variable(name)
    }

    const STORAGE: &str = r#"
[resources.storage]
type = "Microsoft.Storage/storageAccounts"
api_version = "2023-01-01"
name = "mcdata"
location = "eastus"

[resources.fileService]
type = "Microsoft.Storage/storageAccounts/fileServices"
api_version = "2023-01-01"
parent = "storage"
name = "default"
"#;

    #[test]
    fn test_interpolation_with_arithmetic() {
        let template = template(
            r#"
[parameters.memoryInGB]
type = "int"
default = 6

[variables]
maxMemory = "${memoryInGB - 1}G"
"#,
        );
        assert_eq!(variable(&template, "maxMemory").unwrap(), Value::from("5G"));
    }

    #[test]
    fn test_supplied_value_wins_over_default() {
        let template = template(
            r#"
[parameters.containerGroupName]
type = "string"
default = "pixelmon"

[variables]
dnsLabel = "${toLower(containerGroupName)}"
"#,
        );
        let mut ev = Evaluator::new(&template, Scope::default());
        ev.bind(HashMap::from([(
            "containerGroupName".to_string(),
            Value::from("Pixelmon-Server"),
        )]));
        assert_eq!(ev.variable("dnsLabel").unwrap(), Value::from("pixelmon-server"));
    }

    #[test]
    fn test_missing_required_parameter() {
        let template = template(
            r#"
[parameters.serverName]
type = "string"

[variables]
motd = "Welcome to ${serverName}"
"#,
        );
        let err = variable(&template, "motd").unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter 'serverName'");
    }

    #[test]
    fn test_cycle_is_reported_with_its_path() {
        let template = template(
            r#"
[variables]
a = "${b}"
b = "${a}"
"#,
        );
        let err = variable(&template, "a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cyclic reference: variables.a -> variables.b -> variables.a"
        );
    }

    #[test]
    fn test_resource_names_and_ids() {
        let template = template(&format!(
            "{}\n[variables]\nshareName = \"${{fileService.name}}\"\nserviceId = \"${{fileService.id}}\"\n",
            STORAGE
        ));
        assert_eq!(variable(&template, "shareName").unwrap(), Value::from("mcdata/default"));
        assert_eq!(
            variable(&template, "serviceId").unwrap(),
            Value::from(
                "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/gamehost\
                 /providers/Microsoft.Storage/storageAccounts/mcdata/fileServices/default"
            )
        );
    }

    #[test]
    fn test_declared_and_runtime_properties() {
        let template = template(
            r#"
[variables]
kind = "${containerGroup.properties.ipAddress.type}"
ip = "${containerGroup.properties.ipAddress.ip}"
sku = "${containerGroup.sku.name}"

[resources.containerGroup]
type = "Microsoft.ContainerInstance/containerGroups"
api_version = "2023-05-01"
name = "pixelmon"

[resources.containerGroup.properties.ipAddress]
type = "Public"
"#,
        );
        assert_eq!(variable(&template, "kind").unwrap(), Value::from("Public"));
        assert_eq!(
            variable(&template, "ip").unwrap().to_string(),
            "[reference('pixelmon').ipAddress.ip]"
        );
        assert_eq!(
            variable(&template, "sku").unwrap().to_string(),
            "[reference('pixelmon', '2023-05-01', 'Full').sku.name]"
        );
    }

    #[test]
    fn test_list_keys_is_a_runtime_value() {
        let template = template(&format!(
            "{}\n[variables]\nkey = \"${{listKeys(storage).keys[0].value}}\"\n",
            STORAGE
        ));
        assert_eq!(
            variable(&template, "key").unwrap().to_string(),
            "[listKeys('/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/gamehost\
             /providers/Microsoft.Storage/storageAccounts/mcdata', '2023-01-01').keys[0].value]"
        );
    }

    #[test]
    fn test_reading_excluded_resource_is_dangling() {
        let template = template(
            r#"
[parameters.enableLogAnalytics]
type = "bool"
default = false

[variables]
workspaceId = "${logAnalytics.properties.customerId}"
guarded = "${enableLogAnalytics ? logAnalytics.properties.customerId : 'Log Analytics disabled'}"

[resources.logAnalytics]
type = "Microsoft.OperationalInsights/workspaces"
api_version = "2022-10-01"
name = "logs"
condition = "${enableLogAnalytics}"
"#,
        );
        let err = variable(&template, "workspaceId").unwrap_err();
        assert_eq!(err.kind(), "DanglingReference");
        assert_eq!(
            variable(&template, "guarded").unwrap(),
            Value::from("Log Analytics disabled")
        );
    }

    #[test]
    fn test_loop_instances() {
        let template = template(&format!(
            r#"{}
[parameters.fileShareNames]
type = "array"
default = ["pixelmon-data", "terraria-data"]

[variables]
second = "${{shares[1].name}}"
outOfRange = "${{shares[2].name}}"
whole = "${{shares.name}}"

[resources.shares]
type = "Microsoft.Storage/storageAccounts/fileServices/shares"
api_version = "2023-01-01"
parent = "fileService"
for_each = "${{fileShareNames}}"
name = "${{item}}"
"#,
            STORAGE
        ));

        let mut ev = Evaluator::new(&template, Scope::default());
        let instances = ev.instances("shares").unwrap();
        let ids: Vec<String> = instances.iter().map(Instance::id).collect();
        assert_eq!(ids, ["shares[0]", "shares[1]"]);

        assert_eq!(
            variable(&template, "second").unwrap(),
            Value::from("mcdata/default/terraria-data")
        );

        let err = variable(&template, "outOfRange").unwrap_err();
        assert_eq!(
            err.to_string(),
            "index 2 is out of range in 'variables.outOfRange' (length 2)"
        );

        let err = variable(&template, "whole").unwrap_err();
        assert_eq!(err.kind(), "TypeMismatch");
    }

    #[test]
    fn test_touched_resources_become_references() {
        let template = template(&format!(
            r#"{}
[variables]
storageName = "${{storage.name}}"

[resources.share]
type = "Microsoft.Storage/storageAccounts/fileServices/shares"
api_version = "2023-01-01"
parent = "fileService"
name = "data"
label = "${{storageName}}-data"
"#,
            STORAGE
        ));
        let mut ev = Evaluator::new(&template, Scope::default());
        let share = ev.instances("share").unwrap().remove(0);
        ev.full_name(&share).unwrap();
        assert_eq!(ev.field(&share, "label").unwrap(), Value::from("mcdata-data"));

        let refs: Vec<String> = ev.references_of(&share).into_iter().collect();
        assert_eq!(refs, ["storage"]);
    }
}
