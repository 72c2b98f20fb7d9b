// ==========================================
// PlantX 运维智能中台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑, 不含网络调用
// ==========================================

pub mod ai;
pub mod ticket;
pub mod timestamp;
pub mod types;

// 重导出核心类型
pub use ai::{
    AiAnswer, AiQuery, AnswerMode, ChatMessage, ChatRole, LocalModel, SopDocument, SopRequest,
    SopStep,
};
pub use ticket::{
    FailureStage, ImportOutcome, NewTicket, RawTicketRecord, RowFailure, Ticket,
    EXTERNAL_ID_FIELD,
};
pub use types::{AiProviderKind, PersistenceStrategy, StoreBackend, TicketPriority, TicketStatus};
