// Rules module - 自定义规则系统
// YAML 规则包：模型、加载与编译为逐行检查器

pub mod loader;
pub mod model;
pub mod scanner;
