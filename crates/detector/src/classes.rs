use crate::errors::DetectError;

/// The three concrete pathologies the model was trained to recognize.
///
/// Class ids follow the training label order; `from_id` is the only way to
/// turn a raw model output index into a class, so an id outside the known
/// set fails with a named error instead of an out-of-bounds panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectClass {
    CorrodedRebar,
    Spalling,
    Cracking,
}

impl DefectClass {
    pub const ALL: [DefectClass; 3] = [
        DefectClass::CorrodedRebar,
        DefectClass::Spalling,
        DefectClass::Cracking,
    ];

    pub fn from_id(id: u32) -> Result<Self, DetectError> {
        match id {
            0 => Ok(DefectClass::CorrodedRebar),
            1 => Ok(DefectClass::Spalling),
            2 => Ok(DefectClass::Cracking),
            other => Err(DetectError::UnknownClass(other)),
        }
    }

    /// Display label, matching the training labels of the deployed model.
    pub fn label(self) -> &'static str {
        match self {
            DefectClass::CorrodedRebar => "Acreo Corroído",
            DefectClass::Spalling => "Desprendimiento",
            DefectClass::Cracking => "Grietas",
        }
    }

    /// Likely causes shown to the user for this pathology.
    pub fn causes(self) -> &'static [&'static str; 3] {
        match self {
            DefectClass::CorrodedRebar => &[
                "Exposición prolongada a ambientes húmedos.",
                "Presencia de sales en el entorno.",
                "Deficiente protección del recubrimiento de hormigón.",
            ],
            DefectClass::Spalling => &[
                "Fallas en el proceso constructivo.",
                "Impactos mecánicos o físicos.",
                "Reacciones químicas en los materiales.",
            ],
            DefectClass::Cracking => &[
                "Sobrecarga estructural.",
                "Contracción del hormigón durante el curado.",
                "Asentamiento desigual de la base.",
            ],
        }
    }
}
