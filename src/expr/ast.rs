use std::fmt;

/// A numeric literal. Integer and floating-point values stay distinct all
/// the way through serialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn to_json(self) -> serde_json::Value {
        match self {
            Num::Int(i) => serde_json::json!(i),
            Num::Float(f) => serde_json::json!(f),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(i) => write!(f, "{}", i),
            Num::Float(v) => write!(f, "{}", v),
        }
    }
}

/// One step of a symbol reference: `.name` or `[i]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    Field(String),
    Index(usize),
}

/// One segment of an interpolated string. Segments alternate literal text
/// and embedded expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpPart {
    Lit(String),
    Expr(Expr),
}

/// Asset and archive constructor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    StringAsset,
    FileAsset,
    RemoteAsset,
    FileArchive,
    RemoteArchive,
    AssetArchive,
}

impl AssetKind {
    pub fn tag(self) -> &'static str {
        match self {
            AssetKind::StringAsset => "stringAsset",
            AssetKind::FileAsset => "fileAsset",
            AssetKind::RemoteAsset => "remoteAsset",
            AssetKind::FileArchive => "fileArchive",
            AssetKind::RemoteArchive => "remoteArchive",
            AssetKind::AssetArchive => "assetArchive",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "stringAsset" => Some(AssetKind::StringAsset),
            "fileAsset" => Some(AssetKind::FileAsset),
            "remoteAsset" => Some(AssetKind::RemoteAsset),
            "fileArchive" => Some(AssetKind::FileArchive),
            "remoteArchive" => Some(AssetKind::RemoteArchive),
            "assetArchive" => Some(AssetKind::AssetArchive),
            _ => None,
        }
    }
}

/// The expression AST every template value lowers into. A tagged sum with
/// disjoint visitors: the serializer, the reference walker, and the builtin
/// evaluator each dispatch over the same tag set.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(Num),
    String(String),

    /// A string with `${…}` segments.
    Interp(Vec<InterpPart>),

    /// A reference to a top-level declaration, with optional accessor steps.
    Symbol {
        base: String,
        accessors: Vec<Accessor>,
    },

    List(Vec<Expr>),

    /// A mapping; entry order is declaration order.
    Object(Vec<(String, Expr)>),

    /// A call to a registered builtin by name.
    Builtin {
        name: String,
        arg: Box<Expr>,
    },

    /// A named function call resolved by the deployment engine.
    Invoke {
        token: String,
        args: Box<Expr>,
        options: Option<Box<Expr>>,
    },

    Asset {
        kind: AssetKind,
        arg: Box<Expr>,
    },

    /// Wraps a value as sensitive. Nesting is preserved unchanged.
    Secret(Box<Expr>),
}
