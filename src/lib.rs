// ==========================================
// 病区资源管理系统 - 库入口
// ==========================================
// 分层:
// - domain:     实体与草稿类型
// - repository: QueryBuilder / 通用 CRUD / 具体仓储
// - db:         SQLite 连接初始化与 schema
// - logging:    tracing 订阅器初始化
// ==========================================

pub mod db;
pub mod domain;
pub mod logging;
pub mod repository;

pub use domain::{
    Admission, AdmissionState, Bed, Doctor, NewBed, NewDoctor, NewPatient, NewRoom, Patient, Room,
    DATETIME_FORMAT,
};
pub use repository::{
    AdmissionRepository, BedRepository, DoctorRepository, OccupiedBedDetail, PatientRepository,
    RepeatPatientRow, RepositoryError, RepositoryResult, RoomRepository, WardRepositories,
};
