//! Fixed-size IPC message.
//!
//! Messages are copied by value between user buffers and mailboxes, so the
//! layout is `#[repr(C)]` and every field, payload variants included, is a
//! plain integer: any 48-byte pattern read from user memory is a valid
//! `Message`. Payload structs have no padding, and the payload union is
//! zero-filled before a variant is written, so no byte is ever
//! uninitialized.

use core::fmt;

/// What a message means. Carried on the wire as a raw `u32` so unknown
/// kinds pass through the kernel untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageKind {
    /// Delivery problem; see [`ErrorArg`].
    Error = 0,
    /// A timer created by `create_timer` fired.
    TimerTimeout = 1,
    /// Ask the window server for a window.
    OpenWindow = 2,
    /// Window server reply carrying the new layer id.
    LayerId = 3,
    /// Fill a rectangle inside a window.
    WinFillRectangle = 4,
    /// Draw one character inside a window.
    WinWriteChar = 5,
    /// Push a window's pixels to the screen.
    WinRedraw = 6,
    /// Destroy a window.
    CloseWindow = 7,
}

impl MessageKind {
    /// Decodes the wire value.
    pub const fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Error),
            1 => Some(Self::TimerTimeout),
            2 => Some(Self::OpenWindow),
            3 => Some(Self::LayerId),
            4 => Some(Self::WinFillRectangle),
            5 => Some(Self::WinWriteChar),
            6 => Some(Self::WinRedraw),
            7 => Some(Self::CloseWindow),
            _ => None,
        }
    }
}

/// Payload of [`MessageKind::Error`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorArg {
    /// Non-zero: the receiver was waiting for someone else; send again later.
    pub retry: u32,
}

/// Payload of [`MessageKind::TimerTimeout`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerArg {
    /// Absolute tick the timer was armed for.
    pub timeout: u64,
    /// Value the timer was armed with. Negative for one-shot timers.
    pub value: i64,
}

/// Payload of [`MessageKind::OpenWindow`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenWindowArg {
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
}

/// Payload of [`MessageKind::LayerId`], [`MessageKind::WinRedraw`] and
/// [`MessageKind::CloseWindow`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerIdArg {
    /// Window layer.
    pub layer_id: u32,
}

/// Payload of [`MessageKind::WinFillRectangle`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinFillRectangleArg {
    /// Window layer.
    pub layer_id: u32,
    /// Left edge, window coordinates.
    pub x: i32,
    /// Top edge, window coordinates.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
    /// `0xRRGGBB`.
    pub color: u32,
    /// Non-zero: redraw the window afterwards.
    pub draw: u32,
}

/// Payload of [`MessageKind::WinWriteChar`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinWriteCharArg {
    /// Window layer.
    pub layer_id: u32,
    /// Left edge, window coordinates.
    pub x: i32,
    /// Top edge, window coordinates.
    pub y: i32,
    /// `0xRRGGBB`.
    pub color: u32,
    /// The character, zero-extended.
    pub c: u32,
    /// Non-zero: redraw the window afterwards.
    pub draw: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
union MessageArg {
    raw: [u64; 4],
    error: ErrorArg,
    timer: TimerArg,
    open_window: OpenWindowArg,
    layer_id: LayerIdArg,
    fill_rectangle: WinFillRectangleArg,
    write_char: WinWriteCharArg,
}

impl MessageArg {
    const ZERO: Self = Self { raw: [0; 4] };
}

/// One IPC message.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Message {
    /// Wire value of [`MessageKind`].
    pub kind: u32,
    reserved: u32,
    /// Sender. Overwritten by the kernel on `send_message`; 0 for
    /// kernel-originated messages.
    pub src_task: u64,
    arg: MessageArg,
}

const _: () = assert!(core::mem::size_of::<Message>() == 48);

impl Message {
    /// A message of `kind` with an all-zero payload.
    pub const fn new(kind: MessageKind) -> Self {
        Self::with_raw_kind(kind as u32)
    }

    /// Same as [`Message::new`] for a kind this crate does not know.
    pub const fn with_raw_kind(kind: u32) -> Self {
        Self {
            kind,
            reserved: 0,
            src_task: 0,
            arg: MessageArg::ZERO,
        }
    }

    /// Returns the decoded kind, if known.
    pub const fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_u32(self.kind)
    }

    /// Sets [`Message::src_task`].
    #[must_use]
    pub const fn with_src(mut self, src_task: u64) -> Self {
        self.src_task = src_task;
        self
    }

    /// The bounce sent back by a selective receive.
    pub fn error_retry() -> Self {
        let mut msg = Self::new(MessageKind::Error);
        msg.arg.error = ErrorArg { retry: 1 };
        msg
    }

    /// Timer expiry notification.
    pub fn timer_timeout(timeout: u64, value: i64) -> Self {
        let mut msg = Self::new(MessageKind::TimerTimeout);
        msg.arg.timer = TimerArg { timeout, value };
        msg
    }

    /// Window creation request.
    pub fn open_window(w: i32, h: i32, x: i32, y: i32) -> Self {
        let mut msg = Self::new(MessageKind::OpenWindow);
        msg.arg.open_window = OpenWindowArg { w, h, x, y };
        msg
    }

    /// Window server reply.
    pub fn layer_id(layer_id: u32) -> Self {
        Self::with_layer(MessageKind::LayerId, layer_id)
    }

    /// Rectangle fill request.
    pub fn win_fill_rectangle(arg: WinFillRectangleArg) -> Self {
        let mut msg = Self::new(MessageKind::WinFillRectangle);
        msg.arg.fill_rectangle = arg;
        msg
    }

    /// Character draw request.
    pub fn win_write_char(arg: WinWriteCharArg) -> Self {
        let mut msg = Self::new(MessageKind::WinWriteChar);
        msg.arg.write_char = arg;
        msg
    }

    /// Redraw request.
    pub fn win_redraw(layer_id: u32) -> Self {
        Self::with_layer(MessageKind::WinRedraw, layer_id)
    }

    /// Window close request.
    pub fn close_window(layer_id: u32) -> Self {
        Self::with_layer(MessageKind::CloseWindow, layer_id)
    }

    fn with_layer(kind: MessageKind, layer_id: u32) -> Self {
        let mut msg = Self::new(kind);
        msg.arg.layer_id = LayerIdArg { layer_id };
        msg
    }

    /// The raw 32 payload bytes as four words.
    pub fn payload_words(&self) -> [u64; 4] {
        // SAFETY: Every variant is plain integers with no padding and the
        // union starts zero-filled, so all 32 bytes are initialized.
        unsafe { self.arg.raw }
    }

    /// Payload of an `Error` message.
    pub fn error(&self) -> Option<ErrorArg> {
        // SAFETY: See `payload_words`; any bit pattern is a valid `ErrorArg`.
        (self.kind() == Some(MessageKind::Error)).then(|| unsafe { self.arg.error })
    }

    /// Payload of a `TimerTimeout` message.
    pub fn timer(&self) -> Option<TimerArg> {
        // SAFETY: Any bit pattern is a valid `TimerArg`.
        (self.kind() == Some(MessageKind::TimerTimeout)).then(|| unsafe { self.arg.timer })
    }

    /// Payload of an `OpenWindow` message.
    pub fn open_window_arg(&self) -> Option<OpenWindowArg> {
        // SAFETY: Any bit pattern is a valid `OpenWindowArg`.
        (self.kind() == Some(MessageKind::OpenWindow)).then(|| unsafe { self.arg.open_window })
    }

    /// Layer of a `LayerId`, `WinRedraw` or `CloseWindow` message.
    pub fn layer(&self) -> Option<LayerIdArg> {
        match self.kind() {
            // SAFETY: Any bit pattern is a valid `LayerIdArg`.
            Some(MessageKind::LayerId | MessageKind::WinRedraw | MessageKind::CloseWindow) => {
                Some(unsafe { self.arg.layer_id })
            }
            _ => None,
        }
    }

    /// Payload of a `WinFillRectangle` message.
    pub fn fill_rectangle(&self) -> Option<WinFillRectangleArg> {
        // SAFETY: Any bit pattern is a valid `WinFillRectangleArg`.
        (self.kind() == Some(MessageKind::WinFillRectangle))
            .then(|| unsafe { self.arg.fill_rectangle })
    }

    /// Payload of a `WinWriteChar` message.
    pub fn write_char(&self) -> Option<WinWriteCharArg> {
        // SAFETY: Any bit pattern is a valid `WinWriteCharArg`.
        (self.kind() == Some(MessageKind::WinWriteChar)).then(|| unsafe { self.arg.write_char })
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new(MessageKind::Error)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.src_task == other.src_task
            && self.payload_words() == other.payload_words()
    }
}

impl Eq for Message {}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Message");
        match self.kind() {
            Some(kind) => s.field("kind", &kind),
            None => s.field("kind", &self.kind),
        };
        s.field("src_task", &self.src_task)
            .field("payload", &self.payload_words())
            .finish()
    }
}
