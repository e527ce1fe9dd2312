use std::path::Path;

use sha2::{Digest, Sha256};

/// SHA-256 output length in bytes.
pub const CODE_DIGEST_LEN: usize = 32;

const COMPILETIME_PINNED_DIGEST: Option<&str> = option_env!("LEDGERGUARD_PINNED_CODE_SHA256");

/// A span of this process's own mapped code. Only
/// [`locate_code_region`] produces values, so a region always refers to
/// readable image memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRegion {
    base: usize,
    len: usize,
}

impl CodeRegion {
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The digest the running code is expected to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceDigest {
    /// Nothing was pinned at build or deploy time. Verification passes
    /// vacuously so unpinned developer builds keep working.
    Unset,
    Pinned([u8; CODE_DIGEST_LEN]),
}

impl ReferenceDigest {
    /// Resolve the pinned digest from the environment: the
    /// `LEDGERGUARD_PINNED_CODE_SHA256` variable wins, then the file
    /// named by `LEDGERGUARD_PINNED_CODE_SHA256_FILE`, then the value
    /// baked in at compile time.
    pub fn resolve() -> Self {
        if let Ok(raw) = std::env::var("LEDGERGUARD_PINNED_CODE_SHA256") {
            if let Some(reference) = Self::from_hex(&raw) {
                return reference;
            }
        }

        if let Ok(path) = std::env::var("LEDGERGUARD_PINNED_CODE_SHA256_FILE") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                if let Ok(content) = std::fs::read_to_string(trimmed) {
                    if let Some(reference) = Self::from_hex(&content) {
                        return reference;
                    }
                }
            }
        }

        COMPILETIME_PINNED_DIGEST
            .and_then(Self::from_hex)
            .unwrap_or(Self::Unset)
    }

    pub fn from_hex(raw: &str) -> Option<Self> {
        let normalized = normalize_digest_hex(raw)?;
        let bytes = hex::decode(normalized).ok()?;
        let digest = <[u8; CODE_DIGEST_LEN]>::try_from(bytes.as_slice()).ok()?;
        Some(Self::Pinned(digest))
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }
}

/// Outcome of comparing the live code digest against the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityCheck {
    /// No reference digest is pinned; nothing to compare against.
    NotPinned,
    Clean,
    Mismatch {
        expected: [u8; CODE_DIGEST_LEN],
        observed: [u8; CODE_DIGEST_LEN],
    },
    /// The live code could not be located or read.
    ProbeFailed { detail: String },
}

impl IntegrityCheck {
    /// An unpinned reference passes; a probe failure does not. Telling a
    /// relocated code section apart from an attack is not possible here,
    /// so failure to measure is treated as failure to verify.
    pub fn passed(&self) -> bool {
        matches!(self, Self::NotPinned | Self::Clean)
    }
}

/// Measure the live code and compare it against the reference digest.
pub fn check_code_integrity(reference: &ReferenceDigest) -> IntegrityCheck {
    let ReferenceDigest::Pinned(expected) = reference else {
        return IntegrityCheck::NotPinned;
    };
    match compute_code_digest() {
        Ok(observed) if &observed == expected => IntegrityCheck::Clean,
        Ok(observed) => IntegrityCheck::Mismatch {
            expected: *expected,
            observed,
        },
        Err(detail) => IntegrityCheck::ProbeFailed { detail },
    }
}

/// SHA-256 over this process's own mapped code bytes.
pub fn compute_code_digest() -> Result<[u8; CODE_DIGEST_LEN], String> {
    let region = locate_code_region()?;
    Ok(digest_code_region(region))
}

/// Hash a located region in place. The live bytes are fed to the hasher
/// directly, never copied out first.
pub fn digest_code_region(region: CodeRegion) -> [u8; CODE_DIGEST_LEN] {
    // SAFETY: regions only come out of locate_code_region, which reports
    // spans inside this process's own mapped executable image.
    let bytes = unsafe { core::slice::from_raw_parts(region.base as *const u8, region.len) };
    Sha256::digest(bytes).into()
}

/// Find this process's code span by walking the executable headers the
/// loader mapped at the image base.
#[cfg(windows)]
pub fn locate_code_region() -> Result<CodeRegion, String> {
    use windows_sys::Win32::System::LibraryLoader::GetModuleHandleA;

    // SAFETY: a null module name yields the base of the executable that
    // created the process.
    let base = unsafe { GetModuleHandleA(core::ptr::null()) };
    if base.is_null() {
        return Err("executable image base unavailable".to_string());
    }
    // SAFETY: the image headers at the module base are mapped readable
    // for the lifetime of the process; every offset the walk follows is
    // validated against the header magics first.
    unsafe { walk_pe_headers(base as *const u8) }
}

#[cfg(windows)]
unsafe fn walk_pe_headers(base: *const u8) -> Result<CodeRegion, String> {
    const DOS_MAGIC: u16 = 0x5A4D; // "MZ"
    const PE_SIGNATURE: u32 = 0x0000_4550; // "PE\0\0"
    const SECTION_HEADER_LEN: usize = 40;

    if read_u16(base, 0) != DOS_MAGIC {
        return Err("DOS magic missing at image base".to_string());
    }
    let e_lfanew = read_u32(base, 0x3C) as usize;
    if e_lfanew == 0 || e_lfanew > 0x1000 {
        return Err(format!("implausible file header offset {:#x}", e_lfanew));
    }

    let nt = base.add(e_lfanew);
    if read_u32(nt, 0) != PE_SIGNATURE {
        return Err("PE signature missing".to_string());
    }
    let number_of_sections = read_u16(nt, 6) as usize;
    let size_of_optional_header = read_u16(nt, 20) as usize;

    let mut section = nt.add(24 + size_of_optional_header);
    for _ in 0..number_of_sections {
        let name = core::slice::from_raw_parts(section, 8);
        if name == b".text\0\0\0" {
            let virtual_size = read_u32(section, 8) as usize;
            let virtual_address = read_u32(section, 12) as usize;
            if virtual_size == 0 {
                return Err("code section is empty".to_string());
            }
            return Ok(CodeRegion {
                base: base as usize + virtual_address,
                len: virtual_size,
            });
        }
        section = section.add(SECTION_HEADER_LEN);
    }
    Err("no .text section in image".to_string())
}

/// Find this process's code span by walking the executable headers the
/// loader mapped at the image base.
#[cfg(target_os = "linux")]
pub fn locate_code_region() -> Result<CodeRegion, String> {
    let image_base = executable_image_base()?;
    // SAFETY: the image headers at the base of our own executable
    // mapping are readable for the lifetime of the process; every offset
    // the walk follows is validated against the header magics first.
    unsafe { walk_elf_headers(image_base as *const u8) }
}

#[cfg(target_os = "linux")]
fn executable_image_base() -> Result<usize, String> {
    let exe = std::fs::read_link("/proc/self/exe")
        .map_err(|err| format!("resolve executable path: {}", err))?;
    let maps = std::fs::read_to_string("/proc/self/maps")
        .map_err(|err| format!("read memory maps: {}", err))?;

    let mut base: Option<usize> = None;
    for line in maps.lines() {
        let mut fields = line.split_whitespace();
        let Some(range) = fields.next() else {
            continue;
        };
        // Skip permissions, offset, device and inode to reach the path.
        let Some(path) = fields.nth(4) else {
            continue;
        };
        if Path::new(path) != exe {
            continue;
        }
        let Some(start_hex) = range.split('-').next() else {
            continue;
        };
        let Ok(start) = usize::from_str_radix(start_hex, 16) else {
            continue;
        };
        base = Some(base.map_or(start, |current| current.min(start)));
    }
    base.ok_or_else(|| "executable image not found in memory maps".to_string())
}

#[cfg(target_os = "linux")]
unsafe fn walk_elf_headers(base: *const u8) -> Result<CodeRegion, String> {
    const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
    const ELFCLASS64: u8 = 2;
    const PT_LOAD: u32 = 1;
    const PF_X: u32 = 1;
    const PAGE_MASK: usize = 0xFFF;

    let ident = core::slice::from_raw_parts(base, 5);
    if ident[..4] != ELF_MAGIC {
        return Err("ELF magic missing at image base".to_string());
    }
    if ident[4] != ELFCLASS64 {
        return Err("only 64-bit images are supported".to_string());
    }

    let e_phoff = read_u64(base, 0x20) as usize;
    let e_phentsize = read_u16(base, 0x36) as usize;
    let e_phnum = read_u16(base, 0x38) as usize;
    if e_phoff == 0 || e_phnum == 0 || e_phentsize == 0 {
        return Err("program header table missing".to_string());
    }

    let mut min_load_vaddr: Option<usize> = None;
    let mut code_segment: Option<(usize, usize)> = None;
    for index in 0..e_phnum {
        let header = base.add(e_phoff + index * e_phentsize);
        if read_u32(header, 0) != PT_LOAD {
            continue;
        }
        let p_flags = read_u32(header, 4);
        let p_vaddr = read_u64(header, 0x10) as usize;
        let p_filesz = read_u64(header, 0x20) as usize;
        min_load_vaddr = Some(min_load_vaddr.map_or(p_vaddr, |v| v.min(p_vaddr)));
        if p_flags & PF_X != 0 && code_segment.is_none() {
            code_segment = Some((p_vaddr, p_filesz));
        }
    }

    let (Some(min_load_vaddr), Some((p_vaddr, p_filesz))) = (min_load_vaddr, code_segment) else {
        return Err("no executable load segment in image".to_string());
    };
    if p_filesz == 0 {
        return Err("executable load segment is empty".to_string());
    }

    // The image base sits at the page-floored lowest load address; the
    // difference is the relocation bias applied to every segment.
    let bias = (base as usize).wrapping_sub(min_load_vaddr & !PAGE_MASK);
    Ok(CodeRegion {
        base: bias.wrapping_add(p_vaddr),
        len: p_filesz,
    })
}

#[cfg(not(any(windows, target_os = "linux")))]
pub fn locate_code_region() -> Result<CodeRegion, String> {
    Err("code region discovery is not supported on this platform".to_string())
}

/// Digest the code bytes of an executable on disk, reproducing what
/// [`compute_code_digest`] reports once that executable is running.
/// This is what deployment tooling pins.
pub fn measure_executable_file(path: &Path) -> Result<String, String> {
    let binary = std::fs::read(path)
        .map_err(|err| format!("read executable {}: {}", path.display(), err))?;
    let object = goblin::Object::parse(&binary)
        .map_err(|err| format!("parse executable {}: {}", path.display(), err))?;
    match object {
        goblin::Object::Elf(elf) => elf_code_digest(&elf, &binary),
        goblin::Object::PE(pe) => pe_code_digest(&pe, &binary),
        _ => Err(format!(
            "unsupported executable format: {}",
            path.display()
        )),
    }
}

fn elf_code_digest(elf: &goblin::elf::Elf<'_>, binary: &[u8]) -> Result<String, String> {
    use goblin::elf::program_header::{PF_X, PT_LOAD};

    let header = elf
        .program_headers
        .iter()
        .find(|ph| ph.p_type == PT_LOAD && ph.p_flags & PF_X != 0)
        .ok_or_else(|| "no executable load segment found".to_string())?;

    let start = usize::try_from(header.p_offset)
        .map_err(|_| "segment offset out of range".to_string())?;
    let size = usize::try_from(header.p_filesz)
        .map_err(|_| "segment size out of range".to_string())?;
    let end = start
        .checked_add(size)
        .filter(|end| *end <= binary.len())
        .ok_or_else(|| "executable segment exceeds file size".to_string())?;

    Ok(hex::encode(Sha256::digest(&binary[start..end])))
}

fn pe_code_digest(pe: &goblin::pe::PE<'_>, binary: &[u8]) -> Result<String, String> {
    let section = pe
        .sections
        .iter()
        .find(|section| section.name().map(|name| name == ".text").unwrap_or(false))
        .ok_or_else(|| "no .text section found".to_string())?;

    let start = section.pointer_to_raw_data as usize;
    let virtual_size = section.virtual_size as usize;
    let copy_len = virtual_size.min(section.size_of_raw_data as usize);
    let end = start
        .checked_add(copy_len)
        .filter(|end| *end <= binary.len())
        .ok_or_else(|| "code section exceeds file size".to_string())?;

    // The loader zero-extends the raw section data up to its virtual
    // size, so the on-disk digest has to do the same to match.
    let mut image_bytes = vec![0u8; virtual_size];
    image_bytes[..copy_len].copy_from_slice(&binary[start..end]);
    Ok(hex::encode(Sha256::digest(&image_bytes)))
}

pub fn normalize_digest_hex(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.len() != CODE_DIGEST_LEN * 2 {
        return None;
    }
    if !normalized.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    Some(normalized)
}

#[cfg(any(windows, target_os = "linux"))]
unsafe fn read_u16(base: *const u8, offset: usize) -> u16 {
    base.add(offset).cast::<u16>().read_unaligned()
}

#[cfg(any(windows, target_os = "linux"))]
unsafe fn read_u32(base: *const u8, offset: usize) -> u32 {
    base.add(offset).cast::<u32>().read_unaligned()
}

#[cfg(target_os = "linux")]
unsafe fn read_u64(base: *const u8, offset: usize) -> u64 {
    base.add(offset).cast::<u64>().read_unaligned()
}
