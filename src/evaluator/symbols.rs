//! Name resolution: parameters, enums, bindings, imports and re-exports

use super::context::{Callable, Frame};
use super::engine::{Evaluator, ValueSource};
use crate::ast::{Binding, EnumDeclaration, ExportSpecifier, Expression, ExpressionNode, LambdaData};
use crate::error::{ConfError, ConfResult};
use crate::model::ConfValue;
use crate::model::coercion::to_property_key;
use crate::program::FileId;
use crate::registry::{MACRO_MODULE, MacroKind};

/// Re-export hops followed before giving up
const MAX_EXPORT_DEPTH: usize = 32;

/// What an identifier or property chain refers to
#[derive(Debug)]
pub(super) enum Reference<'a> {
    /// An evaluated value
    Value(ConfValue),
    /// An optional chain met `null`/`undefined`
    ShortCircuit,
    /// An enum declaration, usable only as the base of a member access
    Enum {
        file: FileId,
        declaration: &'a EnumDeclaration,
    },
    /// `import * as ns`
    Namespace(FileId),
    /// A binding or default export holding an arrow function
    Function { lambda: &'a LambdaData, file: FileId },
    /// A name imported from the macro module
    Macro(MacroKind),
}

/// A top-level declaration a name resolves to
#[derive(Debug)]
enum Declaration<'a> {
    Binding { file: FileId, binding: &'a Binding },
    Enum { file: FileId, declaration: &'a EnumDeclaration },
    DefaultExport { file: FileId, expression: &'a Expression },
    Namespace(FileId),
    Macro(MacroKind),
}

#[derive(Debug, Clone, Copy)]
enum ImportedName<'a> {
    Named(&'a str),
    Default,
    Namespace,
}

type Site<'s> = (&'s FileId, usize);

impl<'a> Evaluator<'a> {
    /// Resolve an identifier, property access or element access
    pub(super) fn resolve_reference(
        &mut self,
        expr: &'a Expression,
        frame: Frame<'_>,
    ) -> ConfResult<Reference<'a>> {
        match &expr.value {
            ExpressionNode::Identifier(name) => self.resolve_identifier(name, expr.start, frame),
            ExpressionNode::Member {
                base,
                property,
                optional,
            } => {
                let base = self.resolve_reference(base, frame)?;
                self.resolve_member(base, property, *optional, expr, frame)
            }
            ExpressionNode::Index {
                base,
                index,
                optional,
            } => {
                let base = self.resolve_reference(base, frame)?;
                match &base {
                    Reference::ShortCircuit => return Ok(Reference::ShortCircuit),
                    Reference::Value(value) if *optional && value.is_nullish() => {
                        return Ok(Reference::ShortCircuit);
                    }
                    _ => {}
                }
                let key = to_property_key(&self.eval(index, frame)?);
                self.resolve_member(base, &key, *optional, expr, frame)
            }
            ExpressionNode::TypeAssertion(inner) => self.resolve_reference(inner, frame),
            _ => self.eval(expr, frame).map(Reference::Value),
        }
    }

    fn resolve_identifier(&mut self, name: &str, offset: usize, frame: Frame<'_>) -> ConfResult<Reference<'a>> {
        if let Some(value) = frame.parameter(name) {
            return Ok(Reference::Value(value.clone()));
        }
        if let Some(enum_name) = frame.enum_name {
            let enums = self.enums;
            if let Some(entry) = enums.get(frame.file, enum_name, name) {
                self.dependencies.extend(&entry.dependencies);
                return Ok(Reference::Value(entry.value.clone()));
            }
        }

        let site = (frame.file, offset);
        match self.lookup_declaration(frame.file, name, site)? {
            Some(declaration) => self.declaration_reference(declaration, name, site),
            None => match name {
                "undefined" => Ok(Reference::Value(ConfValue::Absent)),
                "NaN" => Ok(Reference::Value(ConfValue::Number(f64::NAN))),
                "Infinity" => Ok(Reference::Value(ConfValue::Number(f64::INFINITY))),
                _ => Err(self.unresolved(name, format!("Cannot find name '{name}'"), site)),
            },
        }
    }

    fn resolve_member(
        &mut self,
        base: Reference<'a>,
        property: &str,
        optional: bool,
        expr: &'a Expression,
        frame: Frame<'_>,
    ) -> ConfResult<Reference<'a>> {
        let site = (frame.file, expr.start);
        match base {
            Reference::ShortCircuit => Ok(Reference::ShortCircuit),
            Reference::Value(value) => {
                if optional && value.is_nullish() {
                    return Ok(Reference::ShortCircuit);
                }
                match value.property(property) {
                    Some(found) => Ok(Reference::Value(found)),
                    None => Err(ConfError::TypeMismatch {
                        expected: format!("object (reading '{property}')"),
                        actual: value.type_name().to_string(),
                        location: self.location(frame.file, expr.start),
                    }),
                }
            }
            Reference::Enum { file, declaration } => self
                .enum_member(&file, declaration, property, site)
                .map(Reference::Value),
            Reference::Namespace(target) => {
                let declaration = self.resolve_export(&target, property, site, 0)?;
                self.declaration_reference(declaration, property, site)
            }
            Reference::Function { .. } => Err(self.unsupported(
                frame.file,
                expr.start,
                format!("Cannot read '{property}' of an arrow function"),
            )),
            Reference::Macro(kind) => Err(self.unsupported(
                frame.file,
                expr.start,
                format!("Cannot read '{property}' of macro '{kind}'"),
            )),
        }
    }

    fn enum_member(
        &mut self,
        file: &FileId,
        declaration: &'a EnumDeclaration,
        member: &str,
        site: Site<'_>,
    ) -> ConfResult<ConfValue> {
        let enums = self.enums;
        let Some(entry) = enums.get(file, &declaration.name, member) else {
            let qualified = format!("{}.{member}", declaration.name);
            let reason = if declaration.members.iter().any(|m| m.name == member) {
                format!("Enum member '{qualified}' is used before it is initialized")
            } else {
                format!("Enum '{}' has no member '{member}'", declaration.name)
            };
            return Err(self.unresolved(&qualified, reason, site));
        };
        self.dependencies.insert(file);
        self.dependencies.extend(&entry.dependencies);
        Ok(entry.value.clone())
    }

    /// Find what a top-level name of `file` is declared as
    fn lookup_declaration(
        &mut self,
        file: &FileId,
        name: &str,
        site: Site<'_>,
    ) -> ConfResult<Option<Declaration<'a>>> {
        let graph = self.graph;
        if let Some(declaration) = graph.enum_declaration(file, name) {
            return Ok(Some(Declaration::Enum {
                file: file.clone(),
                declaration,
            }));
        }
        if let Some(binding) = graph.local_binding(file, name) {
            return Ok(Some(Declaration::Binding {
                file: file.clone(),
                binding,
            }));
        }

        for import in graph.import_declarations(file) {
            if import.type_only {
                continue;
            }
            let imported = if import.default.as_deref() == Some(name) {
                ImportedName::Default
            } else if import.namespace.as_deref() == Some(name) {
                ImportedName::Namespace
            } else if let Some(specifier) = import.value_specifiers().find(|s| s.local == name) {
                ImportedName::Named(&specifier.imported)
            } else {
                continue;
            };
            return self
                .resolve_import(file, &import.module, imported, name, site)
                .map(Some);
        }
        Ok(None)
    }

    fn resolve_import(
        &mut self,
        file: &FileId,
        module: &str,
        imported: ImportedName<'a>,
        name: &str,
        site: Site<'_>,
    ) -> ConfResult<Declaration<'a>> {
        if module == MACRO_MODULE {
            if let ImportedName::Named(exported) = imported {
                if let Some(kind) = MacroKind::from_name(exported) {
                    return Ok(Declaration::Macro(kind));
                }
            }
            let known: Vec<&str> = MacroKind::ALL.iter().map(|kind| kind.name()).collect();
            return Err(self.unresolved(
                name,
                format!("'{MACRO_MODULE}' only exports {}", known.join(", ")),
                site,
            ));
        }

        let Some(target) = self.graph.resolve_import(file, module) else {
            return Err(self.unresolved(name, format!("Cannot find module '{module}'"), site));
        };
        match imported {
            ImportedName::Namespace => Ok(Declaration::Namespace(target)),
            ImportedName::Default => self.resolve_export(&target, "default", site, 0),
            ImportedName::Named(exported) => self.resolve_export(&target, exported, site, 0),
        }
    }

    /// Find the declaration `target` exports as `name`, following export
    /// lists and re-exports
    fn resolve_export(
        &mut self,
        target: &FileId,
        name: &str,
        site: Site<'_>,
        depth: usize,
    ) -> ConfResult<Declaration<'a>> {
        if depth > MAX_EXPORT_DEPTH {
            return Err(ConfError::CycleDetected {
                name: name.to_string(),
                location: self.location(site.0, site.1),
            });
        }
        let graph = self.graph;
        if !graph.contains(target) {
            return Err(self.unresolved(name, format!("'{target}' has no evaluable source"), site));
        }

        let found = self.find_export(target, name, site, depth)?;
        match found {
            Some(declaration) => {
                self.dependencies.insert(target);
                Ok(declaration)
            }
            None => Err(self.unresolved(
                name,
                format!("Module '{target}' has no exported member '{name}'"),
                site,
            )),
        }
    }

    fn find_export(
        &mut self,
        target: &FileId,
        name: &str,
        site: Site<'_>,
        depth: usize,
    ) -> ConfResult<Option<Declaration<'a>>> {
        let graph = self.graph;
        if name == "default" {
            if let Some(expression) = graph.exported_expression(target) {
                return Ok(Some(Declaration::DefaultExport {
                    file: target.clone(),
                    expression,
                }));
            }
        } else if let Some(binding) = graph
            .local_bindings(target)
            .iter()
            .rev()
            .find(|b| b.exported && b.name == name)
        {
            return Ok(Some(Declaration::Binding {
                file: target.clone(),
                binding,
            }));
        } else if let Some(declaration) = graph
            .enum_declarations(target)
            .iter()
            .find(|e| e.exported && e.name == name)
        {
            return Ok(Some(Declaration::Enum {
                file: target.clone(),
                declaration,
            }));
        }

        for specifier in graph.export_specifiers(target) {
            match specifier {
                ExportSpecifier::Local { local, exported } if exported == name => {
                    return match self.lookup_declaration(target, local, site)? {
                        Some(declaration) => Ok(Some(declaration)),
                        None => Err(self.unresolved(
                            local,
                            format!("'{target}' exports '{local}' but does not declare it"),
                            site,
                        )),
                    };
                }
                ExportSpecifier::ReExport {
                    module,
                    imported,
                    exported,
                } if exported == name => {
                    let Some(next) = graph.resolve_import(target, module) else {
                        return Err(self.unresolved(name, format!("Cannot find module '{module}'"), site));
                    };
                    return self.resolve_export(&next, imported, site, depth + 1).map(Some);
                }
                _ => {}
            }
        }

        if name != "default" {
            for specifier in graph.export_specifiers(target) {
                let ExportSpecifier::ReExportAll { module } = specifier else {
                    continue;
                };
                let Some(next) = graph.resolve_import(target, module) else {
                    continue;
                };
                if let Ok(declaration) = self.resolve_export(&next, name, site, depth + 1) {
                    return Ok(Some(declaration));
                }
            }
        }
        Ok(None)
    }

    fn declaration_reference(
        &mut self,
        declaration: Declaration<'a>,
        name: &str,
        site: Site<'_>,
    ) -> ConfResult<Reference<'a>> {
        match declaration {
            Declaration::Binding { file, binding } => {
                if let Some(lambda) = binding.initializer.as_ref().and_then(arrow_of) {
                    self.dependencies.insert(&file);
                    return Ok(Reference::Function { lambda, file });
                }
                let value = self.evaluate_source(
                    ValueSource::Binding(file.clone(), binding.start),
                    &binding.name,
                    &file,
                    binding.initializer.as_ref(),
                    site,
                )?;
                Ok(Reference::Value(value))
            }
            Declaration::DefaultExport { file, expression } => {
                if let Some(lambda) = arrow_of(expression) {
                    self.dependencies.insert(&file);
                    return Ok(Reference::Function { lambda, file });
                }
                let value = self.evaluate_source(
                    ValueSource::DefaultExport(file.clone()),
                    name,
                    &file,
                    Some(expression),
                    site,
                )?;
                Ok(Reference::Value(value))
            }
            Declaration::Enum { file, declaration } => Ok(Reference::Enum { file, declaration }),
            Declaration::Namespace(file) => Ok(Reference::Namespace(file)),
            Declaration::Macro(kind) => Ok(Reference::Macro(kind)),
        }
    }

    /// Turn a reference into a plain value
    pub(super) fn reference_value(
        &self,
        reference: Reference<'a>,
        expr: &Expression,
        frame: Frame<'_>,
    ) -> ConfResult<ConfValue> {
        let name = expr.value.unwrap_type_assertions().as_identifier();
        self.value_of(reference, name, expr.start, frame)
    }

    /// Value of a bare identifier, as in a shorthand property `{ name }`
    pub(super) fn identifier_value(&mut self, name: &str, offset: usize, frame: Frame<'_>) -> ConfResult<ConfValue> {
        let reference = self.resolve_identifier(name, offset, frame)?;
        self.value_of(reference, Some(name), offset, frame)
    }

    fn value_of(
        &self,
        reference: Reference<'a>,
        name: Option<&str>,
        offset: usize,
        frame: Frame<'_>,
    ) -> ConfResult<ConfValue> {
        match reference {
            Reference::Value(value) => Ok(value),
            Reference::ShortCircuit => Ok(ConfValue::Absent),
            Reference::Enum { declaration, .. } => Err(self.unsupported(
                frame.file,
                offset,
                format!(
                    "Enum '{}' cannot be used as a value; reference one of its members",
                    declaration.name
                ),
            )),
            Reference::Namespace(target) => Err(self.unsupported(
                frame.file,
                offset,
                format!("Namespace import of '{target}' cannot be used as a value"),
            )),
            Reference::Function { .. } => Err(self.unsupported(
                frame.file,
                offset,
                "Arrow functions can only be called or passed to a macro",
            )),
            Reference::Macro(kind) => Err(self.macro_not_imported(kind, name, offset, frame)),
        }
    }

    /// Turn a callee reference into something [`apply`](Evaluator::apply)
    /// accepts; `None` when an optional chain short-circuited
    pub(super) fn reference_callable(
        &self,
        reference: Reference<'a>,
        callee: &Expression,
        frame: Frame<'_>,
    ) -> ConfResult<Option<Callable<'a, 'static>>> {
        let actual = match reference {
            Reference::Function { lambda, file } => {
                return Ok(Some(Callable {
                    lambda,
                    file,
                    scope: None,
                }));
            }
            Reference::ShortCircuit => return Ok(None),
            Reference::Macro(kind) => {
                let name = callee.value.unwrap_type_assertions().as_identifier();
                return Err(self.macro_not_imported(kind, name, callee.start, frame));
            }
            Reference::Value(value) => {
                if !matches!(callee.value.unwrap_type_assertions(), ExpressionNode::Identifier(_)) {
                    return Err(self.unsupported(
                        frame.file,
                        callee.start,
                        "Method calls are not supported",
                    ));
                }
                value.type_name()
            }
            Reference::Enum { .. } => "enum",
            Reference::Namespace(_) => "namespace",
        };
        Err(ConfError::TypeMismatch {
            expected: "function".to_string(),
            actual: actual.to_string(),
            location: self.location(frame.file, callee.start),
        })
    }

    fn macro_not_imported(&self, kind: MacroKind, name: Option<&str>, offset: usize, frame: Frame<'_>) -> ConfError {
        let name = name.unwrap_or(kind.name());
        if self.options.macro_enabled {
            return self.unsupported(frame.file, offset, format!("Macro '{name}' must be called directly"));
        }
        ConfError::MacroNotImported {
            name: name.to_string(),
            macro_enabled: false,
            location: self.location(frame.file, offset),
        }
    }

    fn unresolved(&self, name: &str, reason: String, (file, offset): Site<'_>) -> ConfError {
        ConfError::UnresolvedReference {
            name: name.to_string(),
            reason,
            location: self.location(file, offset),
        }
    }
}

/// The arrow function an initializer holds, looking through type assertions
fn arrow_of(expr: &Expression) -> Option<&LambdaData> {
    match expr.value.unwrap_type_assertions() {
        ExpressionNode::Arrow(lambda) => Some(&**lambda),
        _ => None,
    }
}
