pub mod client;
pub mod domain;
pub mod ports;
pub mod prompts;

pub use domain::{
    ChatMessage, ChatRole, CropHealthPoint, Language, PestDetectionRecord, PestReport, Profile,
    ProfileUpdate, QueryKind, QueryRecord, SignupDetails, User, UserCredentials, WeatherReport,
};
pub use ports::{
    CropImageAnalysisService, DatabaseService, FarmingAdviceService, HostedBackend, PortError,
    PortResult, WeatherService,
};
