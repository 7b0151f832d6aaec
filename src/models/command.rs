/// The closed catalog of automatable desktop actions.
///
/// Labels are the stable identifiers written to configuration documents.
/// Earlier releases wrote Spanish labels; those are still accepted on decode
/// (see [`CommandSlot::from_label`]) so old documents keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSlot {
    MoveCursor,
    LeftClick,
    RightClick,
    Copy,
    Paste,
    Undo,
    AltTab,
    CloseWindow,
    StartMenu,
    ScreenRecord,
    VolumeUp,
    VolumeDown,
    Mute,
    Screenshot,
    LockScreen,
    Escape,
}

impl CommandSlot {
    pub const ALL: [CommandSlot; 16] = [
        CommandSlot::MoveCursor,
        CommandSlot::LeftClick,
        CommandSlot::RightClick,
        CommandSlot::Copy,
        CommandSlot::Paste,
        CommandSlot::Undo,
        CommandSlot::AltTab,
        CommandSlot::CloseWindow,
        CommandSlot::StartMenu,
        CommandSlot::ScreenRecord,
        CommandSlot::VolumeUp,
        CommandSlot::VolumeDown,
        CommandSlot::Mute,
        CommandSlot::Screenshot,
        CommandSlot::LockScreen,
        CommandSlot::Escape,
    ];

    /// The reserved cancel slot; its binding can never be changed.
    pub const PROTECTED: CommandSlot = CommandSlot::Escape;

    /// Stable identifier used in configuration documents.
    pub fn label(self) -> &'static str {
        match self {
            CommandSlot::MoveCursor => "Move Cursor",
            CommandSlot::LeftClick => "Left Click",
            CommandSlot::RightClick => "Right Click",
            CommandSlot::Copy => "Copy",
            CommandSlot::Paste => "Paste",
            CommandSlot::Undo => "Undo",
            CommandSlot::AltTab => "Alt-Tab",
            CommandSlot::CloseWindow => "Close Window",
            CommandSlot::StartMenu => "Start Menu",
            CommandSlot::ScreenRecord => "Screen Record",
            CommandSlot::VolumeUp => "Volume Up",
            CommandSlot::VolumeDown => "Volume Down",
            CommandSlot::Mute => "Mute",
            CommandSlot::Screenshot => "Screenshot",
            CommandSlot::LockScreen => "Lock Screen",
            CommandSlot::Escape => "Escape",
        }
    }

    /// Label written by the original configuration tool, if different.
    fn legacy_alias(self) -> Option<&'static str> {
        match self {
            CommandSlot::MoveCursor => Some("Mover cursor"),
            CommandSlot::LeftClick => Some("Clic izquierdo"),
            CommandSlot::RightClick => Some("Clic derecho"),
            CommandSlot::Copy => Some("Copiar (Ctrl+C)"),
            CommandSlot::Paste => Some("Pegar (Ctrl+V)"),
            CommandSlot::Undo => Some("Deshacer (Ctrl+Z)"),
            CommandSlot::AltTab => Some("Alt+Tab"),
            CommandSlot::CloseWindow => Some("Cerrar Ventana"),
            CommandSlot::StartMenu => Some("Windows"),
            CommandSlot::ScreenRecord => Some("Grabar Pantalla"),
            CommandSlot::VolumeUp => Some("Subir Volumen"),
            CommandSlot::VolumeDown => Some("Bajar Volumen"),
            CommandSlot::Mute => Some("Silenciar"),
            CommandSlot::Screenshot => Some("Captura de Pantalla"),
            CommandSlot::LockScreen => Some("Cerrar Sesion"),
            CommandSlot::Escape => None,
        }
    }

    /// Resolve a document label to a slot, accepting legacy aliases.
    pub fn from_label(label: &str) -> Option<CommandSlot> {
        Self::ALL.iter().copied().find(|slot| {
            slot.label() == label || slot.legacy_alias() == Some(label)
        })
    }

    pub fn is_protected(self) -> bool {
        self == Self::PROTECTED
    }
}

impl std::fmt::Display for CommandSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
