use std::fmt::Display;

#[derive(Debug)]
pub enum NotchplateError {
    Input(String),
    InvalidGeometry(String),
    AmbiguousShapeSelection(String),
    EngineFailure(String),
    PostProcessor(String),
    ParseRecoveryFailure(String),
}

impl Display for NotchplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (err_name, value) = match self {
            NotchplateError::Input(v) => ("Input", v),
            NotchplateError::InvalidGeometry(v) => ("Invalid Geometry", v),
            NotchplateError::AmbiguousShapeSelection(v) => ("Ambiguous Shape Selection", v),
            NotchplateError::EngineFailure(v) => ("Engine Failure", v),
            NotchplateError::PostProcessor(v) => ("Post Processor", v),
            NotchplateError::ParseRecoveryFailure(v) => ("Parse Recovery Failure", v),
        };

        write!(f, "{} error: {}", err_name, value)
    }
}
