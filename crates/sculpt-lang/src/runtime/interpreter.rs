//! Tree-walking evaluator. Statements mutate the context they run in;
//! expressions produce values and may dispatch symbols with side effects.
//! All domain behavior lives in the symbol tables under `namespaces`.

use std::rc::Rc;

use crate::error::{EvalError, EvalResult, ImportError, RuntimeError, RuntimeErrorKind};
use crate::runtime::coerce::Argument;
use crate::runtime::context::{BlockType, Builder, EvaluationContext, MAX_RECURSION_DEPTH, Symbol};
use crate::runtime::delegate::file_name;
use crate::runtime::value::{RangeValue, Value, ValueType};
use crate::syntax::ast::{Block, Expr, Identifier, InfixOp, PrefixOp, Span, Stmt};

impl EvaluationContext<'_> {
    // ─── Statements ──────────────────────────────────────────────────────────

    pub fn evaluate_statements(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        statements.iter().try_for_each(|stmt| self.evaluate_stmt(stmt))
    }

    pub fn evaluate_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        self.cursor = stmt.span();
        match stmt {
            Stmt::Command(name, arg, _) => self.evaluate_command(name, arg.as_ref()),
            Stmt::Block(name, body, span) => {
                let value = self.evaluate_block(name, body)?;
                self.cursor = *span;
                Ok(self.add_value(value)?)
            }
            Stmt::Define(name, definition, _) => {
                let symbol = self.evaluate_definition(definition)?;
                self.define(name.name.clone(), symbol);
                Ok(())
            }
            Stmt::Option(_, _, span) => {
                let keyword = Span::new(span.start, span.start + "option".len());
                Err(self.unknown_symbol("option", keyword))
            }
            Stmt::ForLoop { index, range, body, .. } => self.evaluate_for(index.as_ref(), range, body),
            Stmt::Import(expr, span) => self.evaluate_import(expr, *span),
            Stmt::Expr(expr) => {
                let value = self.evaluate_expr(expr)?;
                self.cursor = expr.span();
                Ok(self.add_value(value)?)
            }
        }
    }

    fn evaluate_command(&mut self, name: &Identifier, arg: Option<&Expr>) -> EvalResult<()> {
        let symbol = self.symbol(&name.name).ok_or_else(|| self.unknown_symbol(&name.name, name.span))?;
        let args = match arg {
            Some(expr) => self.evaluate_parameters(expr)?,
            None => Vec::new(),
        };
        match symbol {
            Symbol::Command(ty, command) => {
                let value = self.coerce(args, ty, &name.name)?;
                let result = command(value, self)?;
                Ok(self.add_value(result)?)
            }
            Symbol::Property(ty, setter, _) => {
                let value = self.coerce(args, ty, &name.name)?;
                setter(value, self)
            }
            Symbol::Block(block_type, builder) => {
                if arg.is_none() && !block_type.children.is_empty() {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::MissingArgument {
                            for_name: name.name.clone(),
                            index: 0,
                            expected: block_type.children_description(),
                        },
                        name.span.after(),
                    )
                    .into());
                }
                let value = self.invoke_with_children(&name.name, block_type, &builder, args)?;
                Ok(self.add_value(value)?)
            }
            Symbol::Constant(value) if args.is_empty() => Ok(self.add_value(value)?),
            Symbol::Constant(value) => {
                let mut values = vec![value];
                values.extend(args.into_iter().map(|a| a.value));
                Ok(self.add_value(Value::Tuple(values))?)
            }
        }
    }

    /// Push a frame for `block_type`, add `args` as its children and build.
    fn invoke_with_children(
        &mut self,
        name: &str,
        block_type: BlockType,
        builder: &Builder,
        args: Vec<Argument>,
    ) -> EvalResult<Value> {
        let mut children = Vec::new();
        for arg in args {
            flatten_children(arg.value, arg.span, &mut children);
        }
        for (index, child) in children.iter().enumerate() {
            let ty = child.value.value_type();
            let promotable = ty == ValueType::Path && block_type.accepts(ValueType::Mesh);
            if !block_type.accepts(ty) && !promotable {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::TypeMismatch {
                        for_name: name.into(),
                        index,
                        expected: "block".into(),
                        got: ty.description().into(),
                    },
                    child.span,
                )
                .into());
            }
        }
        let mut frame = self.push(block_type);
        for child in children {
            frame.add_value(child.value)?;
        }
        builder(&mut frame)
    }

    fn evaluate_for(&mut self, index: Option<&Identifier>, range: &Expr, body: &Block) -> EvalResult<()> {
        let value = match self.evaluate_expr(range)? {
            Value::Tuple(mut values) if values.len() == 1 => values.remove(0),
            other => other,
        };
        match value {
            Value::Range(r) => r.iter().try_for_each(|n| self.iterate(index, Value::Number(n), body)),
            Value::Tuple(values) => values.into_iter().try_for_each(|v| self.iterate(index, v, body)),
            other => Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch {
                    for_name: "for".into(),
                    index: 0,
                    expected: "range or tuple".into(),
                    got: other.value_type().description().into(),
                },
                range.span(),
            )
            .into()),
        }
    }

    fn iterate(&mut self, index: Option<&Identifier>, value: Value, body: &Block) -> EvalResult<()> {
        if self.is_cancelled() {
            tracing::debug!("evaluation cancelled");
            return Err(EvalError::Cancelled);
        }
        self.push_scope(|scope| {
            if let Some(index) = index {
                scope.define(index.name.clone(), Symbol::Constant(value));
            }
            scope.evaluate_statements(&body.statements)
        })
    }

    fn evaluate_import(&mut self, expr: &Expr, span: Span) -> EvalResult<()> {
        let path = match self.evaluate_expr(expr)?.unwrapped() {
            Value::String(Some(path)) => path,
            other => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::TypeMismatch {
                        for_name: "import".into(),
                        index: 0,
                        expected: ValueType::String.description().into(),
                        got: other.value_type().description().into(),
                    },
                    expr.span(),
                )
                .into());
            }
        };
        let url = self.resolve_url(&path);
        tracing::debug!(url = %url.display(), "import");

        let is_script = url.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("shape"));
        if !is_script {
            let geometry = self
                .delegate()
                .import_geometry(&url)
                .map_err(|kind| RuntimeError::new(kind, expr.span()))?;
            if let Some(geometry) = geometry {
                self.cursor = span;
                self.add_value(Value::Mesh(geometry))?;
            }
            return Ok(());
        }

        if self.stack_depth >= MAX_RECURSION_DEPTH {
            return Err(self.recursion_error(span));
        }
        let source: Rc<str> = self
            .delegate()
            .load_source(&url)
            .map_err(|kind| RuntimeError::new(kind, expr.span()))?
            .into();
        let for_name = file_name(&url);
        let wrap = |error: ImportError| -> EvalError {
            RuntimeError::new(
                RuntimeErrorKind::ImportError {
                    error: Box::new(error),
                    for_name: for_name.clone(),
                    source_text: source.clone(),
                },
                span,
            )
            .into()
        };
        let program = crate::syntax::parse(&source).map_err(|e| wrap(e.into()))?;

        let saved_source = std::mem::replace(&mut self.source, source.clone());
        let saved_url = std::mem::replace(&mut self.base_url, Some(url));
        self.stack_depth += 1;
        let result = self.evaluate_statements(&program.statements);
        self.stack_depth -= 1;
        self.source = saved_source;
        self.base_url = saved_url;
        self.cursor = span;

        match result {
            Err(EvalError::Runtime(e)) => Err(wrap(ImportError::Runtime(e))),
            other => other,
        }
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    pub fn evaluate_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Number(n, _)      => Ok(Value::Number(*n)),
            Expr::StringLit(s, _)   => Ok(Value::string(s.clone())),
            Expr::Color(c, _)       => Ok(Value::Color(*c)),
            Expr::Ident(name, span) => self.evaluate_identifier(name, *span),
            Expr::Block(name, body, _) => self.evaluate_block(name, body),
            Expr::Tuple(items, _) => {
                let args = self.evaluate_parameter_list(items)?;
                Ok(Value::Tuple(args.into_iter().map(|a| a.value).collect()))
            }
            Expr::Prefix { op, operand, .. } => {
                let n = self.evaluate_number(operand, op.as_str(), 0)?;
                Ok(Value::Number(match op {
                    PrefixOp::Minus => -n,
                    PrefixOp::Plus  => n,
                }))
            }
            Expr::Infix { left, op, right, .. } => {
                let a = self.evaluate_number(left, op.as_str(), 0)?;
                let b = self.evaluate_number(right, op.as_str(), 1)?;
                Ok(Value::Number(match op {
                    InfixOp::Add => a + b,
                    InfixOp::Sub => a - b,
                    InfixOp::Mul => a * b,
                    InfixOp::Div => a / b,
                }))
            }
            Expr::Range { from, to, step, span } => {
                let start = self.evaluate_number(from, "range", 0)?;
                let end = self.evaluate_number(to, "range", 1)?;
                let step_value = match step {
                    Some(step) => self.evaluate_number(step, "range", 2)?,
                    None => 1.0,
                };
                RangeValue::new(start, end, step_value).map(Value::Range).ok_or_else(|| {
                    let at = step.as_ref().map_or(*span, |s| s.span());
                    RuntimeError::new(
                        RuntimeErrorKind::AssertionFailure("Step value must be nonzero".into()),
                        at,
                    )
                    .into()
                })
            }
            Expr::Member { expr, member, .. } => self.evaluate_member(expr, member),
            Expr::Subexpression(inner, _) => self.evaluate_expr(inner),
        }
    }

    fn evaluate_identifier(&mut self, name: &str, span: Span) -> EvalResult<Value> {
        match self.symbol(name) {
            Some(Symbol::Command(ValueType::Void, command)) => command(Value::VOID, self),
            Some(Symbol::Command(ty, _)) => Err(RuntimeError::new(
                RuntimeErrorKind::MissingArgument {
                    for_name: name.into(),
                    index: 0,
                    expected: ty.description().into(),
                },
                span.after(),
            )
            .into()),
            Some(Symbol::Property(_, _, getter)) => Ok(getter(self)),
            Some(Symbol::Block(block_type, builder)) => {
                if !block_type.children.is_empty() {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::MissingArgument {
                            for_name: name.into(),
                            index: 0,
                            expected: "block".into(),
                        },
                        span.after(),
                    )
                    .into());
                }
                let mut frame = self.push(block_type);
                builder(&mut frame)
            }
            Some(Symbol::Constant(value)) => Ok(value),
            None => Err(self.unknown_symbol(name, span)),
        }
    }

    /// `name { ... }`: option commands bind constants, the rest runs normally.
    fn evaluate_block(&mut self, name: &Identifier, body: &Block) -> EvalResult<Value> {
        let symbol = self.symbol(&name.name).ok_or_else(|| self.unknown_symbol(&name.name, name.span))?;
        let (block_type, builder) = match symbol {
            Symbol::Block(block_type, builder) => (block_type, builder),
            Symbol::Command(ty, _) | Symbol::Property(ty, _, _) => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::TypeMismatch {
                        for_name: name.name.clone(),
                        index: 0,
                        expected: ty.description().into(),
                        got: "block".into(),
                    },
                    body.span,
                )
                .into());
            }
            Symbol::Constant(_) => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::UnexpectedArgument { for_name: name.name.clone(), max: 0 },
                    body.span,
                )
                .into());
            }
        };

        let mut frame = self.push(block_type.clone());
        for stmt in &body.statements {
            match stmt {
                Stmt::Command(option, arg, span) if block_type.option(&option.name).is_some() => {
                    frame.cursor = *span;
                    let ty = block_type.option(&option.name).unwrap_or(ValueType::Tuple);
                    let args = match arg {
                        Some(expr) => frame.evaluate_parameters(expr)?,
                        None => Vec::new(),
                    };
                    let value = frame.coerce(args, ty, &option.name)?;
                    frame.define(option.name.clone(), Symbol::Constant(value));
                }
                other => frame.evaluate_stmt(other)?,
            }
        }
        frame.cursor = name.span.merge(body.span);
        builder(&mut frame)
    }

    /// Member lookup unwraps a single-element tuple once, never more.
    fn evaluate_member(&mut self, base: &Expr, member: &Identifier) -> EvalResult<Value> {
        let value = self.evaluate_expr(base)?;
        if let Some(result) = value.member(&member.name) {
            return Ok(result);
        }
        let value = match value {
            Value::Tuple(mut values) if values.len() == 1 => {
                let inner = values.remove(0);
                if let Some(result) = inner.member(&member.name) {
                    return Ok(result);
                }
                inner
            }
            other => other,
        };
        Err(RuntimeError::new(
            RuntimeErrorKind::UnknownMember {
                name: member.name.clone(),
                of: value.value_type().description().into(),
                options: value.members(),
            },
            member.span,
        )
        .into())
    }

    fn evaluate_number(&mut self, expr: &Expr, for_name: &str, index: usize) -> EvalResult<f64> {
        let value = self.evaluate_expr(expr)?;
        value.as_number().ok_or_else(|| {
            RuntimeError::new(
                RuntimeErrorKind::TypeMismatch {
                    for_name: for_name.into(),
                    index,
                    expected: ValueType::Number.description().into(),
                    got: value.value_type().description().into(),
                },
                expr.span(),
            )
            .into()
        })
    }

    // ─── Parameters ──────────────────────────────────────────────────────────

    /// Arguments of a command, property or block statement.
    ///
    /// A parenthesized tuple is taken apart so each element keeps its own
    /// span: `color (1 0 0 1 0.5)` reports the `0.5`.
    pub fn evaluate_parameters(&mut self, expr: &Expr) -> EvalResult<Vec<Argument>> {
        let mut inner = expr;
        while let Expr::Subexpression(nested, _) = inner {
            inner = nested;
        }
        match inner {
            Expr::Tuple(items, _) => self.evaluate_parameter_list(items),
            other => Ok(vec![Argument::new(self.evaluate_expr(other)?, other.span())]),
        }
    }

    /// An identifier naming a command or block, anywhere but last, takes
    /// the rest of the list as its argument: `translate rnd 1 2`.
    fn evaluate_parameter_list(&mut self, items: &[Expr]) -> EvalResult<Vec<Argument>> {
        let mut args = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let rest = &items[i + 1..];
            if let (Expr::Ident(name, span), Some(last)) = (item, rest.last()) {
                let span = span.merge(last.span());
                match self.symbol(name) {
                    Some(Symbol::Command(ty, command)) => {
                        let rest = self.evaluate_parameter_list(rest)?;
                        let value = self.coerce(rest, ty, name)?;
                        args.push(Argument::new(command(value, self)?, span));
                        return Ok(args);
                    }
                    Some(Symbol::Block(block_type, builder)) => {
                        let rest = self.evaluate_parameter_list(rest)?;
                        let value = self.invoke_with_children(name, block_type, &builder, rest)?;
                        args.push(Argument::new(value, span));
                        return Ok(args);
                    }
                    _ => {}
                }
            }
            args.push(Argument::new(self.evaluate_expr(item)?, item.span()));
        }
        Ok(args)
    }

    // ─── Errors ──────────────────────────────────────────────────────────────

    fn unknown_symbol(&self, name: &str, span: Span) -> EvalError {
        RuntimeError::new(
            RuntimeErrorKind::UnknownSymbol { name: name.into(), options: self.symbol_names() },
            span,
        )
        .into()
    }

    pub(crate) fn recursion_error(&self, span: Span) -> EvalError {
        RuntimeError::new(RuntimeErrorKind::AssertionFailure("Too much recursion".into()), span).into()
    }
}

/// Recursively spread tuples into individual children.
fn flatten_children(value: Value, span: Span, out: &mut Vec<Argument>) {
    match value {
        Value::Tuple(values) => values.into_iter().for_each(|v| flatten_children(v, span, out)),
        other => out.push(Argument::new(other, span)),
    }
}
