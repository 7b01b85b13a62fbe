/// Whether this process may post synthetic input system-wide.
pub trait PermissionService: Send + Sync {
    fn is_granted(&self) -> bool;

    /// Re-checks the grant. With `prompt` the OS may show its consent dialog,
    /// so only pass `true` in response to an explicit user action.
    fn request_if_needed(&self, prompt: bool) -> bool;
}

/// The platform's own permission model. On macOS this is the Accessibility
/// trust list; elsewhere input synthesis needs no grant.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPermission;

impl PermissionService for SystemPermission {
    fn is_granted(&self) -> bool {
        platform::is_trusted()
    }

    fn request_if_needed(&self, prompt: bool) -> bool {
        if platform::is_trusted() {
            return true;
        }
        // Trust only flips after the user acts in System Settings, so the
        // prompt call's own answer is not enough.
        platform::trusted_with_prompt(prompt) && platform::is_trusted()
    }
}

#[cfg(target_os = "macos")]
mod platform {
    pub fn is_trusted() -> bool {
        unsafe { accessibility_sys::AXIsProcessTrusted() }
    }

    pub fn trusted_with_prompt(prompt: bool) -> bool {
        unsafe {
            use core_foundation::base::TCFType;
            use core_foundation::boolean::CFBoolean;
            use core_foundation::dictionary::CFDictionary;
            use core_foundation::string::CFString;

            let key = CFString::wrap_under_get_rule(accessibility_sys::kAXTrustedCheckOptionPrompt);
            let value = if prompt { CFBoolean::true_value() } else { CFBoolean::false_value() };
            let dict = CFDictionary::from_CFType_pairs(&[(key, value)]);
            accessibility_sys::AXIsProcessTrustedWithOptions(dict.as_concrete_TypeRef())
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    pub fn is_trusted() -> bool {
        true
    }

    pub fn trusted_with_prompt(_prompt: bool) -> bool {
        true
    }
}
