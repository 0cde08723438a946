//! Declaration and reference extraction shared by the TypeScript and JavaScript grammars
//!
//! Only top-level statements produce nodes. Everything nested inside a
//! declaration is attributed to that declaration as a reference.

use std::collections::{HashMap, HashSet};

use mindmap_core::{CodeNode, NodeId, NodeKind, PropInfo};
use tree_sitter::{Node, Tree};

use super::{FileExtraction, ImportBinding, ImportDecl, Reference, ReferenceKind};

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

const DB_READS: &[&str] = &[
    "select", "from", "find", "findMany", "findFirst", "findUnique", "findOne", "findById", "count",
    "aggregate", "query",
];

const DB_WRITES: &[&str] = &[
    "insert", "update", "delete", "upsert", "create", "createMany", "updateMany", "deleteMany",
    "save", "remove", "destroy",
];

const DB_DIRS: &[&str] = &["schema", "db", "database", "models"];

/// Walk a parsed file and collect its declarations, imports and references.
pub fn extract(tree: &Tree, source: &str, rel_path: &str) -> FileExtraction {
    let root = tree.root_node();
    let mut walker = Walker::new(source, rel_path);
    walker.prescan(root);
    walker.visit_program(root);
    walker.finish(root)
}

fn text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

fn span_of(node: Node) -> u32 {
    (node.end_position().row - node.start_position().row) as u32 + 1
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

fn contains_kind(node: Node, kinds: &[&str]) -> bool {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if kinds.contains(&n.kind()) {
            return true;
        }
        let mut cursor = n.walk();
        stack.extend(n.named_children(&mut cursor));
    }
    false
}

fn contains_jsx(node: Node) -> bool {
    contains_kind(node, &["jsx_element", "jsx_self_closing_element", "jsx_fragment"])
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

pub(crate) fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

pub(crate) fn is_pascal_case(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name.chars().any(|c| c.is_ascii_lowercase())
}

pub(crate) fn is_upper_snake(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// `app/api/users/route.ts` → `/api/users`, `pages/api/users/index.ts` → `/api/users`.
pub(crate) fn api_route(rel_path: &str) -> Option<String> {
    let segments: Vec<&str> = rel_path.split('/').collect();
    let (file, dirs) = segments.split_last()?;
    let stem = file.split('.').next().unwrap_or(file);

    if stem == "route" {
        let api = dirs.iter().position(|d| *d == "api")?;
        return Some(format!("/{}", dirs[api..].join("/")));
    }

    let pages = dirs.windows(2).position(|w| w[0] == "pages" && w[1] == "api")?;
    let mut parts: Vec<&str> = dirs[pages + 1..].to_vec();
    if stem != "index" {
        parts.push(stem);
    }
    Some(format!("/{}", parts.join("/")))
}

fn is_db_file(rel_path: &str) -> bool {
    rel_path.split('/').any(|segment| {
        let stem = segment.split('.').next().unwrap_or(segment);
        DB_DIRS.contains(&stem)
    })
}

struct Walker<'a> {
    source: &'a str,
    path: &'a str,
    api_route: Option<String>,
    pages_api: bool,
    db_file: bool,
    type_members: HashMap<String, Vec<PropInfo>>,
    exported_names: HashSet<String>,
    default_name: Option<String>,
    out: FileExtraction,
}

impl<'a> Walker<'a> {
    fn new(source: &'a str, path: &'a str) -> Self {
        Walker {
            source,
            path,
            api_route: api_route(path),
            pages_api: path.contains("pages/api/"),
            db_file: is_db_file(path),
            type_members: HashMap::new(),
            exported_names: HashSet::new(),
            default_name: None,
            out: FileExtraction {
                path: path.to_string(),
                ..FileExtraction::default()
            },
        }
    }

    fn text(&self, node: Node) -> &'a str {
        text(node, self.source)
    }

    /// Export lists and type shapes have to be known before declarations are classified.
    fn prescan(&mut self, root: Node) {
        let mut cursor = root.walk();
        for stmt in root.named_children(&mut cursor) {
            let decl = if stmt.kind() == "export_statement" {
                if stmt.child_by_field_name("source").is_none() {
                    self.prescan_export(stmt);
                }
                stmt.child_by_field_name("declaration")
            } else {
                Some(stmt)
            };
            if let Some(decl) = decl {
                self.prescan_type(decl);
            }
        }
    }

    fn prescan_export(&mut self, stmt: Node) {
        let is_default = has_child_kind(stmt, "default");
        if is_default {
            if let Some(value) = stmt.child_by_field_name("value") {
                if value.kind() == "identifier" {
                    let name = self.text(value).to_string();
                    self.exported_names.insert(name.clone());
                    self.default_name = Some(name);
                }
            }
        }

        let mut cursor = stmt.walk();
        for clause in stmt.named_children(&mut cursor) {
            if clause.kind() != "export_clause" {
                continue;
            }
            let mut inner = clause.walk();
            for spec in clause.named_children(&mut inner) {
                let Some(name) = spec.child_by_field_name("name") else {
                    continue;
                };
                let name = self.text(name).to_string();
                let alias = spec.child_by_field_name("alias").map(|a| self.text(a));
                if alias == Some("default") {
                    self.default_name = Some(name.clone());
                }
                self.exported_names.insert(name);
            }
        }
    }

    fn prescan_type(&mut self, decl: Node) {
        let body = match decl.kind() {
            "interface_declaration" => decl.child_by_field_name("body"),
            "type_alias_declaration" => decl
                .child_by_field_name("value")
                .filter(|v| v.kind() == "object_type"),
            _ => None,
        };
        if let (Some(name), Some(body)) = (decl.child_by_field_name("name"), body) {
            let name = self.text(name).to_string();
            let members = self.members_of(body);
            self.type_members.insert(name, members);
        }
    }

    fn members_of(&self, body: Node) -> Vec<PropInfo> {
        let mut cursor = body.walk();
        body.named_children(&mut cursor)
            .filter(|m| m.kind() == "property_signature")
            .filter_map(|m| {
                let name = self.text(m.child_by_field_name("name")?).to_string();
                let type_name = m
                    .child_by_field_name("type")
                    .map(|t| self.text(t).trim_start_matches(':').trim().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Some(PropInfo {
                    name,
                    type_name,
                    required: !has_child_kind(m, "?"),
                })
            })
            .collect()
    }

    fn visit_program(&mut self, root: Node) {
        let mut cursor = root.walk();
        for stmt in root.named_children(&mut cursor) {
            match stmt.kind() {
                "import_statement" => self.import_statement(stmt),
                "export_statement" => self.export_statement(stmt),
                "comment" => {}
                _ => self.declaration(stmt, false, false),
            }
        }
    }

    fn import_statement(&mut self, stmt: Node) {
        let Some(source) = stmt.child_by_field_name("source") else {
            return;
        };
        let mut bindings = Vec::new();
        let mut cursor = stmt.walk();
        for clause in stmt.named_children(&mut cursor) {
            if clause.kind() != "import_clause" {
                continue;
            }
            let mut inner = clause.walk();
            for part in clause.named_children(&mut inner) {
                match part.kind() {
                    "identifier" => bindings.push(ImportBinding {
                        imported: "default".to_string(),
                        local: self.text(part).to_string(),
                    }),
                    "namespace_import" => {
                        let mut ns = part.walk();
                        if let Some(local) = part.named_children(&mut ns).find(|n| n.kind() == "identifier") {
                            bindings.push(ImportBinding {
                                imported: "*".to_string(),
                                local: self.text(local).to_string(),
                            });
                        }
                    }
                    "named_imports" => {
                        let mut specs = part.walk();
                        for spec in part.named_children(&mut specs) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let imported = self.text(name).to_string();
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|a| self.text(a).to_string())
                                .unwrap_or_else(|| imported.clone());
                            bindings.push(ImportBinding { imported, local });
                        }
                    }
                    _ => {}
                }
            }
        }
        self.out.imports.push(ImportDecl {
            source: strip_quotes(self.text(source)).to_string(),
            line: line_of(stmt),
            bindings,
        });
    }

    fn export_statement(&mut self, stmt: Node) {
        if let Some(source) = stmt.child_by_field_name("source") {
            // Re-export: `export { a } from "./a"` / `export * from "./a"`
            let mut bindings = Vec::new();
            let mut cursor = stmt.walk();
            for clause in stmt.named_children(&mut cursor) {
                if clause.kind() != "export_clause" {
                    continue;
                }
                let mut inner = clause.walk();
                for spec in clause.named_children(&mut inner) {
                    if let Some(name) = spec.child_by_field_name("name") {
                        let name = self.text(name).to_string();
                        bindings.push(ImportBinding {
                            imported: name.clone(),
                            local: name,
                        });
                    }
                }
            }
            if bindings.is_empty() {
                bindings.push(ImportBinding {
                    imported: "*".to_string(),
                    local: "*".to_string(),
                });
            }
            self.out.imports.push(ImportDecl {
                source: strip_quotes(self.text(source)).to_string(),
                line: line_of(stmt),
                bindings,
            });
            return;
        }

        let is_default = has_child_kind(stmt, "default");
        if let Some(decl) = stmt.child_by_field_name("declaration") {
            self.declaration(decl, true, is_default);
            return;
        }

        match stmt.child_by_field_name("value") {
            Some(value)
                if self.api_route.is_some()
                    && is_default
                    && matches!(value.kind(), "function_expression" | "function" | "arrow_function") =>
            {
                self.function_like("default", stmt, value, true, true);
            }
            Some(value) if value.kind() == "identifier" => {}
            Some(value) => {
                let refs = self.collect_refs(value, None);
                self.out.references.extend(refs);
            }
            None => {}
        }
    }

    fn is_exported(&self, name: &str, exported: bool) -> bool {
        exported || self.exported_names.contains(name)
    }

    fn is_default(&self, name: &str, is_default: bool) -> bool {
        is_default || self.default_name.as_deref() == Some(name)
    }

    fn declaration(&mut self, decl: Node, exported: bool, is_default: bool) {
        let name = decl.child_by_field_name("name").map(|n| self.text(n));
        match (decl.kind(), name) {
            ("function_declaration" | "generator_function_declaration", Some(name)) => {
                self.function_like(name, decl, decl, exported, is_default);
            }
            ("class_declaration" | "abstract_class_declaration", Some(name)) => {
                self.class(name, decl, decl, exported, is_default);
            }
            ("interface_declaration", Some(name)) => {
                self.simple(name, NodeKind::Interface, decl, exported, is_default);
            }
            ("type_alias_declaration", Some(name)) => {
                self.simple(name, NodeKind::Type, decl, exported, is_default);
            }
            ("enum_declaration", Some(name)) => {
                self.simple(name, NodeKind::Enum, decl, exported, is_default);
            }
            ("lexical_declaration" | "variable_declaration", _) => {
                let mut cursor = decl.walk();
                let declarators: Vec<Node> = decl
                    .named_children(&mut cursor)
                    .filter(|d| d.kind() == "variable_declarator")
                    .collect();
                for declarator in declarators {
                    self.variable(decl, declarator, exported, is_default);
                }
            }
            _ => {
                let refs = self.collect_refs(decl, None);
                self.out.references.extend(refs);
            }
        }
    }

    fn variable(&mut self, decl: Node, declarator: Node, exported: bool, is_default: bool) {
        let name_node = declarator.child_by_field_name("name");
        let Some(name) = name_node.filter(|n| n.kind() == "identifier").map(|n| self.text(n)) else {
            let refs = self.collect_refs(declarator, None);
            self.out.references.extend(refs);
            return;
        };
        let exported = self.is_exported(name, exported);
        let Some(value) = declarator.child_by_field_name("value") else {
            return;
        };
        // A single-declarator statement spans the whole statement, keyword included.
        let span = if decl.named_child_count() == 1 { decl } else { declarator };

        match value.kind() {
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                self.function_like(name, span, value, exported, is_default);
            }
            "class" => self.class(name, span, value, exported, is_default),
            "call_expression" => self.call_value(name, span, value, exported, is_default),
            _ if is_upper_snake(name) || exported => {
                self.simple(name, NodeKind::Constant, span, exported, is_default);
            }
            _ => {
                let refs = self.collect_refs(value, None);
                self.out.references.extend(refs);
            }
        }
    }

    fn call_value(&mut self, name: &str, span: Node, call: Node, exported: bool, is_default: bool) {
        let callee = call
            .child_by_field_name("function")
            .map(|f| self.text(f))
            .unwrap_or("");
        let callee = callee.rsplit('.').next().unwrap_or(callee);

        if callee == "createContext" {
            self.simple(name, NodeKind::Context, span, exported, is_default);
        } else if self.db_file && (callee.ends_with("Table") || callee == "model" || callee == "define") {
            self.database(name, span, call, exported, is_default);
        } else if self.api_route.is_some() && exported && HTTP_METHODS.contains(&name) {
            self.function_like(name, span, call, exported, is_default);
        } else if is_hook_name(name) {
            self.function_like(name, span, call, exported, is_default);
        } else if is_pascal_case(name) && contains_jsx(call) {
            self.function_like(name, span, call, exported, is_default);
        } else if is_upper_snake(name) || exported {
            self.simple(name, NodeKind::Constant, span, exported, is_default);
        } else {
            let refs = self.collect_refs(call, None);
            self.out.references.extend(refs);
        }
    }

    fn new_node(&self, name: &str, kind: NodeKind, span: Node, exported: bool, is_default: bool) -> CodeNode {
        let mut node = CodeNode::new(NodeId::new(self.path, name), name, kind, self.path);
        node.line = Some(line_of(span));
        node.lines_of_code = span_of(span);
        if self.is_exported(name, exported) {
            node.exports.push(name.to_string());
        }
        if self.is_default(name, is_default) {
            node.exports.push("default".to_string());
        }
        node
    }

    fn push(&mut self, node: CodeNode, refs: Vec<Reference>) {
        tracing::trace!("{} {} at line {:?}", node.kind.as_str(), node.id, node.line);
        self.out.references.extend(refs);
        self.out.declarations.push(node);
    }

    fn simple(&mut self, name: &str, kind: NodeKind, span: Node, exported: bool, is_default: bool) {
        let node = self.new_node(name, kind, span, exported, is_default);
        let refs = self.collect_refs(span, Some(name));
        self.push(node, refs);
    }

    fn database(&mut self, name: &str, span: Node, call: Node, exported: bool, is_default: bool) {
        let table = call
            .child_by_field_name("arguments")
            .and_then(|args| {
                let mut cursor = args.walk();
                let first = args
                    .named_children(&mut cursor)
                    .find(|a| a.kind() == "string");
                first
            })
            .map(|s| strip_quotes(self.text(s)).to_string())
            .unwrap_or_else(|| name.to_string());

        let mut node = self.new_node(name, NodeKind::Database, span, exported, is_default);
        node.name = table.clone();
        node.metadata.insert("table".to_string(), table);
        let refs = self.collect_refs(span, Some(name));
        self.push(node, refs);
    }

    fn class(&mut self, name: &str, span: Node, class: Node, exported: bool, is_default: bool) {
        let mut cursor = class.walk();
        let extends_component = class
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "class_heritage")
            .any(|h| self.text(h).contains("Component"));
        let kind = if extends_component || (is_pascal_case(name) && contains_jsx(class)) {
            NodeKind::Component
        } else {
            NodeKind::Class
        };
        let mut node = self.new_node(name, kind, span, exported, is_default);
        let refs = self.collect_refs(span, Some(name));
        if kind == NodeKind::Component {
            node.hooks = hooks_of(&refs);
        }
        self.push(node, refs);
    }

    /// Functions, arrow functions and wrapped function values (`memo(...)`, `forwardRef(...)`).
    fn function_like(&mut self, name: &str, span: Node, func: Node, exported: bool, is_default: bool) {
        let exported = self.is_exported(name, exported);
        let is_default = self.is_default(name, is_default);

        let method = match &self.api_route {
            Some(_) if exported && HTTP_METHODS.contains(&name) => Some(name.to_string()),
            Some(_) if self.pages_api && is_default => Some("ALL".to_string()),
            _ => None,
        };

        let kind = if method.is_some() {
            NodeKind::Api
        } else if is_hook_name(name) {
            NodeKind::Hook
        } else if is_pascal_case(name) && contains_jsx(func) {
            NodeKind::Component
        } else {
            NodeKind::Function
        };

        let mut node = self.new_node(name, kind, span, exported, is_default);
        let refs = self.collect_refs(span, Some(name));

        match kind {
            NodeKind::Api => {
                let method = method.unwrap_or_default();
                let route = self.api_route.clone().unwrap_or_default();
                node.name = format!("{} {}", method, route);
                node.metadata.insert("method".to_string(), method);
                node.metadata.insert("route".to_string(), route);
                node.metadata.insert(
                    "handlesErrors".to_string(),
                    contains_kind(func, &["try_statement"]).to_string(),
                );
            }
            NodeKind::Component => {
                node.props = self.props_of(func);
                node.hooks = hooks_of(&refs);
            }
            NodeKind::Hook => node.hooks = hooks_of(&refs),
            _ => {}
        }
        self.push(node, refs);
    }

    /// Props from the first parameter: its declared type if resolvable, else the destructured names.
    fn props_of(&self, func: Node) -> Option<Vec<PropInfo>> {
        let func = match func.kind() {
            "call_expression" => first_function(func)?,
            _ => func,
        };
        let params = func.child_by_field_name("parameters")?;
        let mut cursor = params.walk();
        let first = params
            .named_children(&mut cursor)
            .find(|p| p.kind() != "comment")?;

        let (pattern, annotation) = match first.kind() {
            "required_parameter" | "optional_parameter" => (
                first.child_by_field_name("pattern"),
                first.child_by_field_name("type"),
            ),
            _ => (Some(first), None),
        };

        let declared = annotation.and_then(|a| a.named_child(0)).and_then(|t| match t.kind() {
            "type_identifier" => self.type_members.get(self.text(t)).cloned(),
            "object_type" => Some(self.members_of(t)),
            _ => None,
        });
        if let Some(members) = declared.filter(|m| !m.is_empty()) {
            return Some(members);
        }

        let pattern = pattern.filter(|p| p.kind() == "object_pattern")?;
        let mut cursor = pattern.walk();
        let props: Vec<PropInfo> = pattern
            .named_children(&mut cursor)
            .filter_map(|p| {
                let (name, required) = match p.kind() {
                    "shorthand_property_identifier_pattern" => (self.text(p), true),
                    "object_assignment_pattern" => (self.text(p.child_by_field_name("left")?), false),
                    "pair_pattern" => (self.text(p.child_by_field_name("key")?), true),
                    _ => return None,
                };
                Some(PropInfo {
                    name: name.to_string(),
                    type_name: "unknown".to_string(),
                    required,
                })
            })
            .collect();
        (!props.is_empty()).then_some(props)
    }

    fn collect_refs(&self, root: Node, owner: Option<&str>) -> Vec<Reference> {
        let mut refs = Vec::new();
        let mut push = |name: &str, kind: ReferenceKind, node: Node| {
            if name.is_empty() {
                return;
            }
            refs.push(Reference {
                owner: owner.map(str::to_string),
                name: name.to_string(),
                kind,
                line: line_of(node),
            });
        };

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "call_expression" => {
                    if let Some(func) = node.child_by_field_name("function") {
                        match func.kind() {
                            "identifier" => {
                                let name = self.text(func);
                                let kind = if is_hook_name(name) {
                                    ReferenceKind::Hook
                                } else {
                                    ReferenceKind::Call
                                };
                                push(name, kind, func);
                            }
                            "member_expression" => {
                                for (name, kind) in self.db_targets(node, func) {
                                    push(name, kind, func);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                "new_expression" => {
                    if let Some(ctor) = node.child_by_field_name("constructor").filter(|c| c.kind() == "identifier") {
                        push(self.text(ctor), ReferenceKind::Call, ctor);
                    }
                }
                "jsx_opening_element" | "jsx_self_closing_element" => {
                    if let Some(tag) = node.child_by_field_name("name") {
                        let head = self.text(tag).split('.').next().unwrap_or("");
                        if head.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                            push(head, ReferenceKind::Jsx, tag);
                        }
                    }
                }
                "type_identifier" => push(self.text(node), ReferenceKind::Type, node),
                "identifier" | "shorthand_property_identifier" => {
                    if !is_handled_elsewhere(node) {
                        push(self.text(node), ReferenceKind::Value, node);
                    }
                }
                _ => {}
            }
            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }

        // One reference per (name, kind), at its first line.
        refs.sort_by(|a, b| (&a.name, a.kind, a.line).cmp(&(&b.name, b.kind, b.line)));
        refs.dedup_by(|a, b| a.name == b.name && a.kind == b.kind);
        refs
    }

    /// Table names a database client call touches: `db.insert(users)`, `prisma.user.create()`.
    fn db_targets(&self, call: Node, member: Node) -> Vec<(&'a str, ReferenceKind)> {
        let Some(property) = member.child_by_field_name("property") else {
            return Vec::new();
        };
        let method = self.text(property);
        let kind = if DB_WRITES.contains(&method) {
            ReferenceKind::DbWrite
        } else if DB_READS.contains(&method) {
            ReferenceKind::DbRead
        } else {
            return Vec::new();
        };

        let mut names = Vec::new();
        if let Some(args) = call.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            for arg in args.named_children(&mut cursor) {
                match arg.kind() {
                    "identifier" => names.push(self.text(arg)),
                    "string" => names.push(strip_quotes(self.text(arg))),
                    _ => {}
                }
            }
        }
        if let Some(object) = member.child_by_field_name("object") {
            match object.kind() {
                "member_expression" => {
                    if let Some(model) = object.child_by_field_name("property") {
                        names.push(self.text(model));
                    }
                }
                "identifier" if is_pascal_case(self.text(object)) => names.push(self.text(object)),
                _ => {}
            }
        }
        names.into_iter().map(|n| (n, kind)).collect()
    }

    fn finish(mut self, root: Node) -> FileExtraction {
        self.out.has_errors = root.has_error();
        self.out.lines_of_code = self.source.lines().count() as u32;

        let mut exports: Vec<String> = self
            .out
            .declarations
            .iter()
            .flat_map(|d| d.exports.iter().cloned())
            .chain(self.exported_names.iter().cloned())
            .collect();
        exports.sort();
        exports.dedup();
        self.out.exports = exports;

        self.out.default_export = self.default_name.clone().or_else(|| {
            self.out
                .declarations
                .iter()
                .find(|d| d.exports.iter().any(|e| e == "default"))
                .map(|d| d.declared_name().to_string())
        });
        self.out
    }
}

/// Identifiers already recorded as calls, constructors or JSX tags.
fn is_handled_elsewhere(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "call_expression" => parent.child_by_field_name("function") == Some(node),
        "new_expression" => parent.child_by_field_name("constructor") == Some(node),
        kind => kind.starts_with("jsx_"),
    }
}

fn first_function(node: Node) -> Option<Node> {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if matches!(n.kind(), "arrow_function" | "function_expression" | "function") {
            return Some(n);
        }
        let mut cursor = n.walk();
        let children: Vec<Node> = n.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

fn hooks_of(refs: &[Reference]) -> Option<Vec<String>> {
    let hooks: Vec<String> = refs
        .iter()
        .filter(|r| r.kind == ReferenceKind::Hook)
        .map(|r| r.name.clone())
        .collect();
    (!hooks.is_empty()).then_some(hooks)
}
