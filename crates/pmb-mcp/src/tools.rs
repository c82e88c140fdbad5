//! Tool catalogue exposed through `tools/list`.
//!
//! Each [`ToolDef`] maps one MCP tool onto one admin API action. The order of
//! [`ToolDef::fields`] is the order parameters are encoded, and therefore the
//! order they are signed in.

use serde_json::{Map, Value, json};

/// Request method a tool prefers. Attachments always force a multipart POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMethod {
    Get,
    Post,
}

/// Shape of a tool input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    StringList,
    /// List of attachment objects, sent as `attach[N]` form parts.
    Attachments,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub action: &'static str,
    pub method: ToolMethod,
    pub fields: &'static [FieldDef],
}

const fn field(
    name: &'static str,
    kind: FieldKind,
    required: bool,
    description: &'static str,
) -> FieldDef {
    FieldDef {
        name,
        kind,
        required,
        description,
    }
}

const EXTRA: FieldDef = field(
    "extra",
    FieldKind::StringList,
    false,
    "Optional extra fields to include in the response",
);

const TOOLS: &[ToolDef] = &[
    ToolDef {
        name: "list_projects",
        description: "List projects visible to the account",
        action: "get_projects",
        method: ToolMethod::Get,
        fields: &[
            field("filter", FieldKind::String, false, "Project filter (e.g. active, archived)"),
            EXTRA,
        ],
    },
    ToolDef {
        name: "get_project",
        description: "Get a single project by ID",
        action: "get_project",
        method: ToolMethod::Get,
        fields: &[
            field("project_id", FieldKind::String, true, "Project ID"),
            EXTRA,
        ],
    },
    ToolDef {
        name: "create_project",
        description: "Create a new project",
        action: "post_project",
        method: ToolMethod::Post,
        fields: &[
            field("name", FieldKind::String, true, "Project name"),
            field("description", FieldKind::String, false, "Project description"),
            field("owner_id", FieldKind::String, false, "User ID of the project owner"),
            field("is_private", FieldKind::Boolean, false, "Restrict the project to its members"),
        ],
    },
    ToolDef {
        name: "list_tasks",
        description: "List tasks, optionally within one project",
        action: "get_tasks",
        method: ToolMethod::Get,
        fields: &[
            field("project_id", FieldKind::String, false, "Restrict to this project"),
            field("filter", FieldKind::String, false, "Task filter (e.g. open, done)"),
            field(
                "assignee_id",
                FieldKind::String,
                false,
                "Restrict to tasks assigned to this user",
            ),
            EXTRA,
        ],
    },
    ToolDef {
        name: "get_task",
        description: "Get a single task by ID",
        action: "get_task",
        method: ToolMethod::Get,
        fields: &[
            field("task_id", FieldKind::String, true, "Task ID"),
            EXTRA,
        ],
    },
    ToolDef {
        name: "create_task",
        description: "Create a task in a project, optionally with file attachments",
        action: "post_task",
        method: ToolMethod::Post,
        fields: &[
            field("project_id", FieldKind::String, true, "Project ID"),
            field("name", FieldKind::String, true, "Task title"),
            field("description", FieldKind::String, false, "Task description"),
            field("assignee_id", FieldKind::String, false, "User ID of the assignee"),
            field("due_date", FieldKind::String, false, "Due date (YYYY-MM-DD)"),
            field("priority", FieldKind::Integer, false, "Priority, higher is more urgent"),
            field("tags", FieldKind::StringList, false, "Tag names"),
            field(
                "attachments",
                FieldKind::Attachments,
                false,
                "Files to attach; each item sets exactly one of data (base64) or url",
            ),
        ],
    },
];

/// All tool definitions, in `tools/list` order.
pub fn catalogue() -> &'static [ToolDef] {
    TOOLS
}

/// Look up a tool by name.
pub fn find(name: &str) -> Option<&'static ToolDef> {
    TOOLS.iter().find(|t| t.name == name)
}

/// MCP tool descriptors for `tools/list`.
pub fn list_tools() -> Vec<Value> {
    TOOLS.iter().map(tool_schema).collect()
}

fn tool_schema(tool: &ToolDef) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for f in tool.fields {
        properties.insert(f.name.to_string(), field_schema(f));
        if f.required {
            required.push(Value::String(f.name.to_string()));
        }
    }
    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    json!({
        "name": tool.name,
        "description": tool.description,
        "inputSchema": schema,
        "annotations": {
            "readOnlyHint": tool.method == ToolMethod::Get,
        }
    })
}

fn field_schema(f: &FieldDef) -> Value {
    match f.kind {
        FieldKind::String => json!({"type": "string", "description": f.description}),
        FieldKind::Integer => json!({"type": "integer", "description": f.description}),
        FieldKind::Boolean => json!({"type": "boolean", "description": f.description}),
        FieldKind::StringList => json!({
            "type": "array",
            "items": {"type": "string"},
            "description": f.description,
        }),
        FieldKind::Attachments => json!({
            "type": "array",
            "description": f.description,
            "items": {
                "type": "object",
                "properties": {
                    "filename": {"type": "string", "description": "File name shown in the task"},
                    "content_type": {"type": "string", "description": "MIME type (default: application/octet-stream)"},
                    "data": {"type": "string", "description": "Base64-encoded file content"},
                    "url": {"type": "string", "description": "URL to download the file from"}
                },
                "required": ["filename"]
            }
        }),
    }
}
