/// A single touch report from the engine.
///
/// Wire shape is one text line with exactly two comma-separated labels:
/// `"<source>,<body part>"`. Labels may contain spaces ("index finger,left
/// eye"); there is no escaping and no version field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchEvent {
    /// What made contact, a hand keypoint label from the engine.
    pub source: String,
    /// Face region that was touched.
    pub body_part: String,
}

impl TouchEvent {
    /// Parse one protocol line; anything but exactly two fields is `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split(',');
        let source = fields.next()?;
        let body_part = fields.next()?;
        if fields.next().is_some() {
            return None;
        }

        Some(Self {
            source: source.to_string(),
            body_part: body_part.to_string(),
        })
    }
}
